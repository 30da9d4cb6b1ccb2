pub mod frame_sink;
pub mod quit_signal;
