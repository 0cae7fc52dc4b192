//! arffsplit CLI - inspect ARFF datasets and split them for training

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

use std::process::ExitCode;

fn main() -> ExitCode {
    arffsplit::cli::run()
}
