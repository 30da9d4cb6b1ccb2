pub mod capture_session;
pub mod sensor_device;
