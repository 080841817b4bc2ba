use log::debug;
use std::time::Duration;

/// Timings and counters of the most recent fixed step.
#[derive(Debug, Default, Clone, Copy)]
pub struct StepProfile {
    pub integrate_time: Duration,
    pub sweep_time: Duration,
    pub resolve_time: Duration,

    pub body_count: usize,
    pub edge_count: usize,
    pub candidate_pairs: usize,
    pub resolved_contacts: usize,
}

impl StepProfile {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn total_time(&self) -> Duration {
        self.integrate_time + self.sweep_time + self.resolve_time
    }

    pub fn report(&self) {
        let total_us = self.total_time().as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        debug!(
            "step: bodies={} edges={} pairs={} contacts={} total={:.2} ms (integrate {:.1}%, sweep {:.1}%, resolve {:.1}%)",
            self.body_count,
            self.edge_count,
            self.candidate_pairs,
            self.resolved_contacts,
            self.total_time().as_secs_f32() * 1000.0,
            self.integrate_time.as_micros() as f32 / total_us * 100.0,
            self.sweep_time.as_micros() as f32 / total_us * 100.0,
            self.resolve_time.as_micros() as f32 / total_us * 100.0,
        );
    }
}
