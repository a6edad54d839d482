use std::time::Duration;

use crate::definitions::cpu;

/// Runtime configuration of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// How many instructions are executed per second.
    pub cpu_hertz: u64,
}

impl Config {
    /// The time a single instruction is given.
    ///
    /// A rate of zero is treated as one instruction per second. The interval
    /// never drops below a nanosecond, every rate above a gigahertz runs at
    /// one.
    pub fn cycle_interval(&self) -> Duration {
        Duration::from_nanos((1_000_000_000 / self.cpu_hertz.max(1)).max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_hertz: cpu::HERTZ,
        }
    }
}
