pub mod config;
pub mod constants;
pub mod data_resolver;
pub mod frame;
pub mod mat_convert;
pub mod region;
