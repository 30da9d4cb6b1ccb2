pub mod highgui_key_wait;
pub mod highgui_window;
pub mod terminal_key_poll;
