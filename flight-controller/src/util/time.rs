use std::sync::OnceLock;
use std::thread;
use std::time::{Duration, Instant};

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

pub fn get_current_system_time_us() -> u64 {
    PROCESS_START.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Absolute-deadline pacer for the flight loop. Each wait advances the
/// deadline by one fixed period; an overrun makes the next wake immediate
/// instead of trying to catch up.
pub struct LoopTimer {
    period: Duration,
    deadline: Instant,
}

impl LoopTimer {
    pub fn new(rate_hz: u32) -> Self {
        LoopTimer {
            period: Duration::from_micros(1_000_000 / rate_hz as u64),
            deadline: Instant::now(),
        }
    }

    /// Re-bases the deadline to now. Called after any deliberately long
    /// operation (gyro zeroing, preference uploads, motor tests).
    pub fn reset(&mut self) {
        self.deadline = Instant::now();
    }

    /// Sleeps until the next deadline. Returns false when the tick overran.
    pub fn wait_next(&mut self) -> bool {
        self.deadline += self.period;
        let now = Instant::now();
        if now >= self.deadline {
            self.deadline = now;
            return false;
        }
        thread::sleep(self.deadline - now);
        true
    }
}
