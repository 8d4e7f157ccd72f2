use std::{
    io::{BufRead, Write},
    path::{Path, PathBuf},
};

use clap::{AppSettings, Parser};
use log::{error, info};

use aot_summary::{archive::unpack_aot, read_aot_dir, write::render_summary, AotError};

#[derive(Parser)]
#[clap(global_setting(AppSettings::DeriveDisplayOrder))]
#[clap(disable_help_subcommand = true)]
#[clap(infer_long_args = true)]
struct Args {
    /// The AOT file to summarise, or a directory it has already been unpacked
    /// into. If not given, you'll be asked for one.
    aot: Option<PathBuf>,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,
}

fn main() {
    let args = Args::parse();
    setup_logging(args.verbosity);

    let aot = match args.aot {
        Some(aot) => aot,
        None => match prompt_for_aot() {
            Some(aot) => aot,
            None => {
                info!("Quitting...");
                return;
            }
        },
    };

    match summarise(&aot) {
        Ok(summary) => print!("{summary}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

fn summarise(aot: &Path) -> Result<String, AotError> {
    let report = if aot.is_dir() {
        read_aot_dir(aot)?
    } else {
        // Dropping the directory removes everything that was unpacked.
        let unpacked = unpack_aot(aot)?;
        read_aot_dir(unpacked.path())?
    };
    Ok(render_summary(&report))
}

/// Keep asking until we get a path that exists. `None` means the user quit.
fn prompt_for_aot() -> Option<PathBuf> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    print!("Enter path to aot file (\"Q\" to quit)\n==>");
    loop {
        let _ = std::io::stdout().flush();
        let line = match lines.next() {
            Some(Ok(line)) => line,
            _ => return None,
        };
        let line = line.trim();
        if line == "Q" {
            return None;
        }
        let path = PathBuf::from(line);
        if path.exists() {
            return Some(path);
        }
        print!("Could not access file, try again.\n==>");
    }
}

fn setup_logging(verbosity: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.init();
}
