use opencv::highgui;

use crate::display::domain::quit_signal::QuitSignal;

const DEFAULT_DELAY_MS: i32 = 1;

/// Key wait of the window library. Also pumps window events, so it must
/// be polled regularly while a window is open.
pub struct HighguiKeyWait {
    delay_ms: i32,
}

impl HighguiKeyWait {
    pub fn new(delay_ms: i32) -> Self {
        Self {
            delay_ms: delay_ms.max(1),
        }
    }

    pub fn delay_ms(&self) -> i32 {
        self.delay_ms
    }
}

impl Default for HighguiKeyWait {
    fn default() -> Self {
        Self::new(DEFAULT_DELAY_MS)
    }
}

impl QuitSignal for HighguiKeyWait {
    fn requested(&mut self) -> Result<bool, Box<dyn std::error::Error>> {
        // -1 means no key within the delay
        Ok(highgui::wait_key(self.delay_ms)? >= 0)
    }
}
