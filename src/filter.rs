use crate::record::AcctRecord;

/// Display filter applied after decoding, never inside the decoder.
///
/// The defaults mirror the classic tool: processes that accumulated no
/// user time are noise and get dropped unless explicitly asked for,
/// and `-e` additionally hides clean zero exits.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterPolicy {
    pub include_zero_time: bool,
    pub skip_zero_exit: bool,
}

impl FilterPolicy {
    pub fn admits(&self, record: &AcctRecord) -> bool {
        if !self.include_zero_time && record.utime == 0 {
            return false;
        }
        if self.skip_zero_exit && record.exitcode == 0 {
            return false;
        }
        true
    }
}
