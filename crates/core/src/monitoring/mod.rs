pub mod monitoring_session;
pub mod permission_gate;
pub mod session_logger;
