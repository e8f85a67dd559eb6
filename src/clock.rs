use crate::record::AcctRecord;

/// The host's clock-tick rate, fixed once at startup and treated as
/// immutable for the rest of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTicks(u64);

impl ClockTicks {
    /// Ask the host for `_SC_CLK_TCK`. Falls back to the near-universal
    /// 100 Hz if sysconf cannot answer.
    pub fn detect() -> Self {
        let hz = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        if hz > 0 {
            Self(hz as u64)
        } else {
            Self(100)
        }
    }

    pub fn new(hz: u64) -> Self {
        debug_assert!(hz > 0, "clock tick rate must be positive");
        Self(hz)
    }

    pub fn per_second(&self) -> u64 {
        self.0
    }

    /// Fill in the record's end time: start time plus whole elapsed
    /// seconds. This is the only derived field; it never comes from
    /// the wire.
    pub fn enrich(&self, record: &mut AcctRecord) {
        record.end_time = record.btime + record.etime / self.0;
    }

    /// Ticks as fractional seconds, for presentation.
    pub fn seconds(&self, ticks: u64) -> f64 {
        ticks as f64 / self.0 as f64
    }
}
