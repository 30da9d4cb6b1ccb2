pub mod capture_logger;
pub mod capture_use_case;
pub mod frame_counts;
