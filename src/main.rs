#![forbid(unsafe_code)]

//! pdumpfs CLI entry point.

use clap::Parser;
use pdumpfs::cli::{self, Cli};

fn main() {
    let args = Cli::parse();
    if let Err(err) = cli::run(&args) {
        eprintln!("pdumpfs: {err}");
        if args.backtrace {
            eprintln!("{}", std::backtrace::Backtrace::force_capture());
        }
        std::process::exit(1);
    }
}
