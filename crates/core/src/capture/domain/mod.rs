pub mod frame_lease;
pub mod frame_source;
