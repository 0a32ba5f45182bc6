//! TaskMage - outline task lists backed by a mergeable JSON store

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = taskmage::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
