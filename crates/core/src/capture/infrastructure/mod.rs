pub mod capture_thread;
pub mod latest_frame_slot;
pub mod trace_frame_source;
