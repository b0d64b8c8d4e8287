/// Source of the timestamp substituted into templated pages.
pub trait Clock: Send + Sync {
    fn now(&self) -> String;
}

/// Local wall-clock time, e.g. `2024-03-01T14:05:09.123`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> String {
        chrono::Local::now()
            .format("%Y-%m-%dT%H:%M:%S%.3f")
            .to_string()
    }
}
