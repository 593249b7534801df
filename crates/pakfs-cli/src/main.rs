//! pakfs CLI entry point.
//!
//! Usage:
//!   pakfs [OPTIONS] <COMMAND> [ARGS]
//!   pakfs --archive data.zip --dir patch cat /gfx/hero.png > hero.png

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;

use pakfs_cli::Status;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    // Logs go to stderr so `cat` output stays clean (respects RUST_LOG)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = pakfs_cli::run(&args, &mut out);
    let _ = out.flush();

    match result {
        Ok(Status::Success) => ExitCode::SUCCESS,
        Ok(Status::Missing) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(2)
        }
    }
}
