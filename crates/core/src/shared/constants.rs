pub const APP_NAME: &str = "FaceOff";

pub const FACE_CASCADE_NAME: &str = "haarcascade_frontalface_default.xml";
pub const LEFT_EYE_CASCADE_NAME: &str = "haarcascade_lefteye_2splits.xml";
pub const RIGHT_EYE_CASCADE_NAME: &str = "haarcascade_righteye_2splits.xml";

/// Directory holding the cascade files, relative to the executable.
pub const DATA_DIR_NAME: &str = "data";

pub const SAMPLE_READ_WAIT_TIMEOUT_MS: u64 = 2000;

/// Title of the preview window.
pub const WINDOW_TITLE: &str = "RGB";
