pub mod alerting;
pub mod capture;
pub mod detection;
pub mod estimation;
pub mod monitoring;
pub mod shared;
