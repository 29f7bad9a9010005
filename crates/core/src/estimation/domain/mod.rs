pub mod camera_calibration;
pub mod distance_estimator;
