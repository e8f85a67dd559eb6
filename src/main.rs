mod clock;
mod comp;
mod config;
mod filter;
mod format;
mod passwd;
mod record;
mod stream;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;

use clock::ClockTicks;
use config::Config;
use filter::FilterPolicy;
use format::Formatter;
use stream::AcctReader;

#[derive(Parser)]
#[command(name = "pacct")]
#[command(about = "Show details of a process accounting data file")]
struct Cli {
    /// Accounting file to read (default: /var/account/pacct, or input.acct_file from config)
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Delimited output, optionally with a custom delimiter [default: |]
    #[arg(short = 'd', long = "delimited", value_name = "CHAR", num_args = 0..=1)]
    delimited: Option<Option<char>>,

    /// Suppress the header lines
    #[arg(short = 'H', long = "no-header")]
    no_header: bool,

    /// Prepend a user name column
    #[arg(short = 'u', long = "user")]
    user: bool,

    /// Suppress processes with an exit code of 0
    #[arg(short = 'e', long = "nonzero-exit")]
    nonzero_exit: bool,

    /// Include processes with a run time of zero (excluded by default)
    #[arg(short = '0', long = "include-zero")]
    include_zero: bool,

    /// Print the accounting file's format version and exit
    #[arg(short = 'v', long = "acct-version")]
    acct_version: bool,

    /// Print progress chatter on stderr
    #[arg(short = 'D', long = "debug")]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::new()?;

    let acct_path = cli
        .file
        .clone()
        .unwrap_or_else(|| config.input.acct_file.clone());

    if cli.debug {
        eprintln!("{} {}", "reading".dimmed(), acct_path.display());
    }

    if cli.acct_version {
        let version = stream::file_version(&acct_path).with_context(|| {
            format!("failed to read accounting file {}", acct_path.display())
        })?;
        match version {
            Some(v) => println!("Accounting file {} is version {}", acct_path.display(), v),
            None => bail!("accounting file {} holds no records", acct_path.display()),
        }
        return Ok(());
    }

    let reader = AcctReader::open(&acct_path).with_context(|| {
        format!("error opening accounting file {}", acct_path.display())
    })?;

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("error opening output file {}", path.display()))?;
            if cli.debug {
                eprintln!("{} {}", "writing".dimmed(), path.display());
            }
            Box::new(BufWriter::new(file))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    let ticks = ClockTicks::detect();
    let policy = FilterPolicy {
        include_zero_time: cli.include_zero,
        skip_zero_exit: cli.nonzero_exit,
    };
    let formatter = Formatter {
        delimited: cli
            .delimited
            .map(|choice| choice.unwrap_or(config.display.delimiter)),
        show_user: cli.user || config.display.show_user,
    };

    if !cli.no_header {
        formatter.write_header(&mut out)?;
    }

    let mut shown = 0usize;
    let mut user_ticks = 0u64;
    for item in reader {
        let mut rec =
            item.with_context(|| format!("error reading {}", acct_path.display()))?;
        ticks.enrich(&mut rec);
        if !policy.admits(&rec) {
            continue;
        }
        formatter.write_record(&mut out, &rec)?;
        shown += 1;
        user_ticks += rec.utime;
    }
    out.flush()?;

    if cli.debug {
        eprintln!(
            "{} {} records, {:.2}s user time",
            "printed".dimmed(),
            shown,
            ticks.seconds(user_ticks)
        );
    }

    Ok(())
}
