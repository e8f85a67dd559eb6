use std::io::{self, Write};
use std::time::{Duration, UNIX_EPOCH};

use chrono::{DateTime, Local};

use crate::passwd;
use crate::record::{AcctFlags, AcctRecord};

// Tabular output shows flags as the classic X/C/S/F column; delimited
// output keeps the original tool's F/S/X/C order.
const TABULAR_FLAGS: [(AcctFlags, char); 4] = [
    (AcctFlags::XSIG, 'X'),
    (AcctFlags::CORE, 'C'),
    (AcctFlags::SU, 'S'),
    (AcctFlags::FORK, 'F'),
];

const DELIMITED_FLAGS: [(AcctFlags, char); 4] = [
    (AcctFlags::FORK, 'F'),
    (AcctFlags::SU, 'S'),
    (AcctFlags::XSIG, 'X'),
    (AcctFlags::CORE, 'C'),
];

/// Renders decoded records as aligned columns or delimited lines.
pub struct Formatter {
    /// `Some(delimiter)` selects delimited output
    pub delimited: Option<char>,
    pub show_user: bool,
}

impl Formatter {
    pub fn write_header(&self, out: &mut dyn Write) -> io::Result<()> {
        match self.delimited {
            Some(d) => self.write_delimited_header(out, d),
            None => self.write_tabular_header(out),
        }
    }

    pub fn write_record(&self, out: &mut dyn Write, record: &AcctRecord) -> io::Result<()> {
        match self.delimited {
            Some(d) => self.write_delimited_record(out, record, d),
            None => self.write_tabular_record(out, record),
        }
    }

    fn write_tabular_header(&self, out: &mut dyn Write) -> io::Result<()> {
        if self.show_user {
            write!(out, "{:<8} ", "user")?;
        }
        writeln!(
            out,
            "{:>20} {:>10} {:>8} {:>6} {:>6} {:>11} {:>11} {:>8} {:>4}",
            "command",
            "date",
            "start",
            "utime",
            "stime",
            "elapsed",
            "average_mem",
            "exitcode",
            "flag"
        )?;
        if self.show_user {
            write!(out, "{:<8} ", "----")?;
        }
        writeln!(
            out,
            "{:>20} {:>10} {:>8} {:>6} {:>6} {:>11} {:>11} {:>8} {:>4}",
            "-------",
            "----",
            "-----",
            "-----",
            "-----",
            "-------",
            "-----------",
            "--------",
            "----"
        )
    }

    fn write_delimited_header(&self, out: &mut dyn Write, d: char) -> io::Result<()> {
        if self.show_user {
            write!(out, "user{}", d)?;
        }
        writeln!(
            out,
            "command{d}date{d}start{d}utime{d}stime{d}elapsed{d}average_mem{d}exitcode{d}flag"
        )
    }

    fn write_tabular_record(&self, out: &mut dyn Write, record: &AcctRecord) -> io::Result<()> {
        if self.show_user {
            write!(out, "{:<8} ", passwd::user_name(record.uid))?;
        }
        let when = local_time(record.btime);
        write!(out, "{:>20} ", record.comm)?;
        write!(out, "  {} ", when.format("%Y%m%d"))?;
        write!(out, "{} ", when.format("%H:%M:%S"))?;
        write!(out, "{:>6} ", record.utime)?;
        write!(out, "{:>6} ", record.stime)?;
        write!(out, "{:>11} ", record.etime)?;
        write!(out, "{:>11} ", record.mem)?;
        write!(out, "{:>8} ", record.exitcode)?;
        writeln!(out, "{}", flag_chars(record.flags, &TABULAR_FLAGS))
    }

    fn write_delimited_record(
        &self,
        out: &mut dyn Write,
        record: &AcctRecord,
        d: char,
    ) -> io::Result<()> {
        if self.show_user {
            write!(out, "{}{}", passwd::user_name(record.uid), d)?;
        }
        let when = local_time(record.btime);
        write!(out, "{}{}", record.comm, d)?;
        write!(out, "{}{}", when.format("%Y%m%d"), d)?;
        write!(out, "{}{}", when.format("%H:%M:%S"), d)?;
        write!(out, "{}{}", record.utime, d)?;
        write!(out, "{}{}", record.stime, d)?;
        write!(out, "{}{}", record.etime, d)?;
        write!(out, "{}{}", record.mem, d)?;
        write!(out, "{}{}", record.exitcode, d)?;
        writeln!(out, "{}{}", flag_chars(record.flags, &DELIMITED_FLAGS), d)
    }
}

fn flag_chars(flags: AcctFlags, order: &[(AcctFlags, char)]) -> String {
    order
        .iter()
        .map(|&(bit, ch)| if flags.contains(bit) { ch } else { '-' })
        .collect()
}

// Total conversion; avoids the ambiguous-local-time corner of
// timestamp lookups.
fn local_time(epoch_seconds: u64) -> DateTime<Local> {
    DateTime::from(UNIX_EPOCH + Duration::from_secs(epoch_seconds))
}
