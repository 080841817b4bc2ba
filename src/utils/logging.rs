use log::{log_enabled, trace, Level};
use std::time::{Duration, Instant};

/// Scoped timer that traces a section and optionally adds its duration to a slot.
pub struct ScopedTimer<'a> {
    label: &'static str,
    start: Instant,
    output: Option<&'a mut Duration>,
}

impl<'a> ScopedTimer<'a> {
    pub fn new(label: &'static str) -> Self {
        if log_enabled!(Level::Trace) {
            trace!("start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            output: None,
        }
    }

    /// Same as [`ScopedTimer::new`], accumulating the elapsed time into `output` on drop.
    pub fn recording(label: &'static str, output: &'a mut Duration) -> Self {
        let mut timer = Self::new(label);
        timer.output = Some(output);
        timer
    }
}

impl Drop for ScopedTimer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if let Some(output) = self.output.as_deref_mut() {
            *output += elapsed;
        }
        if log_enabled!(Level::Trace) {
            trace!("end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}
