use std::time::{Duration, Instant};
use tracing::info;

/// Logs the elapsed time of a scope when dropped, including on early returns and `?`.
pub struct ScopedTimer {
    label: &'static str,
    start: Instant,
}

impl ScopedTimer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        info!(
            "⏱️ Elapsed time during {} in seconds: {:.3}",
            self.label,
            self.start.elapsed().as_secs_f64()
        );
    }
}
