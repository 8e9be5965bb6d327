use std::{path::PathBuf, process};

use clap::Parser;
use loxwalk::{run_file, run_prompt, Options, ScanMode};

/// A tree-walking interpreter for Lox. Runs SCRIPT, or starts a prompt when
/// no script is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Stop at the first scan error instead of reporting all of them.
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG
    /// takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    script: Option<PathBuf>,
}

fn main() {
    let args = Args::try_parse().unwrap_or_else(|e| {
        let _ = e.print();
        process::exit(if e.use_stderr() { 64 } else { 0 });
    });

    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let options = Options {
        scan_mode: if args.strict {
            ScanMode::Strict
        } else {
            ScanMode::Tolerant
        },
    };

    match args.script {
        Some(path) => {
            if let Err(e) = run_file(&path, options, None) {
                eprintln!("{e}");
                process::exit(e.exit_code());
            }
        }
        None => {
            if let Err(e) = run_prompt(options) {
                eprintln!("{e}");
                process::exit(74);
            }
        }
    }
}
