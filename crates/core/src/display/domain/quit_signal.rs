/// Domain interface for the "stop capturing" request.
///
/// Polled once per loop iteration; must not block longer than a few
/// milliseconds.
pub trait QuitSignal {
    fn requested(&mut self) -> Result<bool, Box<dyn std::error::Error>>;
}
