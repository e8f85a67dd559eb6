use bitflags::bitflags;
use thiserror::Error;

use crate::comp;

/// Physical size of one on-disk record. The v2 and v3 layouts arrange
/// their fields differently but share this footprint, which is what
/// lets a reader chunk the file before knowing the version.
pub const ACCT_RECORD_SIZE: usize = 64;

/// Maximum length of the recorded command name.
pub const ACCT_COMM: usize = 16;

/// The version byte sits at the same offset in both layouts.
pub(crate) const VERSION_OFFSET: usize = 1;

bitflags! {
    /// Per-process flags recorded by the kernel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AcctFlags: u8 {
        /// Executed fork but did not exec
        const FORK = 0x01;
        /// Used super-user privileges
        const SU = 0x02;
        /// Dumped core
        const CORE = 0x08;
        /// Was killed by a signal
        const XSIG = 0x10;
    }
}

#[derive(Debug, Error)]
pub enum AcctError {
    #[error("unsupported accounting record version {0} (only 2 and 3 are understood)")]
    UnsupportedVersion(u8),
    #[error("truncated record at end of file: got {got} of 64 bytes")]
    TruncatedRecord { got: usize },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

/// One accounting record, normalized from either on-disk layout.
///
/// All time fields are raw clock ticks; `end_time` is derived after
/// decode by [`crate::clock::ClockTicks::enrich`], never read from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct AcctRecord {
    pub flags: AcctFlags,
    pub version: u8,
    pub uid: u32,
    /// Process creation time, seconds since the epoch
    pub btime: u64,
    pub utime: u64,
    pub stime: u64,
    pub etime: u64,
    pub mem: u64,
    pub exitcode: i32,
    pub comm: String,
    /// Process end time, seconds since the epoch (computed)
    pub end_time: u64,
}

impl AcctRecord {
    /// Decode one raw record. The version byte picks exactly one of the
    /// two layout interpretations; an unrecognized version fails before
    /// any other byte is looked at.
    pub fn decode(buf: &[u8; ACCT_RECORD_SIZE]) -> Result<Self, AcctError> {
        match buf[VERSION_OFFSET] {
            2 => Ok(Self::decode_v2(buf)),
            3 => Ok(Self::decode_v3(buf)),
            v => Err(AcctError::UnsupportedVersion(v)),
        }
    }

    /// acct v2: every duration/memory field is a comp_t, the full
    /// 32-bit uid lives in the compat tail of the struct.
    fn decode_v2(buf: &[u8; ACCT_RECORD_SIZE]) -> Self {
        AcctRecord {
            flags: AcctFlags::from_bits_truncate(buf[0]),
            version: 2,
            uid: u32_at(buf, 56),
            btime: u32_at(buf, 8) as u64,
            utime: comp::expand(u16_at(buf, 12)),
            stime: comp::expand(u16_at(buf, 14)),
            etime: comp::expand(u16_at(buf, 16)),
            mem: comp::expand(u16_at(buf, 18)),
            exitcode: u32_at(buf, 32) as i32,
            comm: comm_text(&buf[36..53]),
            end_time: 0,
        }
    }

    /// acct_v3: elapsed time is stored as a plain float of ticks
    /// instead of a comp_t; everything else still goes through the
    /// compressed codec.
    fn decode_v3(buf: &[u8; ACCT_RECORD_SIZE]) -> Self {
        let etime = f32::from_ne_bytes([buf[28], buf[29], buf[30], buf[31]]);
        AcctRecord {
            flags: AcctFlags::from_bits_truncate(buf[0]),
            version: 3,
            uid: u32_at(buf, 8),
            btime: u32_at(buf, 24) as u64,
            utime: comp::expand(u16_at(buf, 32)),
            stime: comp::expand(u16_at(buf, 34)),
            etime: if etime > 0.0 { etime as u64 } else { 0 },
            mem: comp::expand(u16_at(buf, 36)),
            exitcode: u32_at(buf, 4) as i32,
            comm: comm_text(&buf[48..64]),
            end_time: 0,
        }
    }
}

// The accounting file carries no endianness marker; it is always read
// on the host that wrote it, so native byte order is the contract.
fn u16_at(buf: &[u8], off: usize) -> u16 {
    u16::from_ne_bytes([buf[off], buf[off + 1]])
}

fn u32_at(buf: &[u8], off: usize) -> u32 {
    u32::from_ne_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

/// Copy the command name up to the first NUL, capped at [`ACCT_COMM`]
/// characters so a missing terminator never drags in trailing bytes.
fn comm_text(field: &[u8]) -> String {
    let end = field
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(field.len())
        .min(ACCT_COMM);
    String::from_utf8_lossy(&field[..end]).into_owned()
}
