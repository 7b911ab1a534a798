/// Progress reporting for long-running decode phases.
///
/// Progress is a cooperative signal only: a roughly monotonic 0-100 value and
/// a phase label. Errors never travel through this channel.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: f32, phase: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(f32, &str) + Send + Sync,
{
    fn report(&self, percent: f32, phase: &str) {
        self(percent, phase)
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _percent: f32, _phase: &str) {}
}

/// Notification interval so a pass of `total` items reports about `steps` times.
pub fn report_interval(total: u64, steps: u64) -> u64 {
    (total / steps.max(1)).max(1)
}

pub const PHASE_READING_FILE: &str = "Reading file";
pub const PHASE_DECOMPRESSING: &str = "Decompressing LAZ";
pub const PHASE_READING_POINTS: &str = "Reading points";
pub const PHASE_COLOURING: &str = "Colouring points";
