use tokio::time::Instant;
use tracing::debug;

/// Logs how long the enclosing scope took when dropped
pub struct ScopedTimer {
    start: Instant,
    name: &'static str,
    key: String,
}

impl ScopedTimer {
    pub fn new(
        name: &'static str,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        debug!(target: "timing", %key, "started {}", name);
        Self {
            start: Instant::now(),
            name,
            key,
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        debug!(target: "timing", key = %self.key, "finished {} in {} ms", self.name, elapsed.as_millis());
    }
}
