pub mod alert_policy;
pub mod alert_sink;
pub mod close_face_alert;
