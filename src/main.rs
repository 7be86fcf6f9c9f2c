use clap::Parser;
use nvg::cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let code = Cli::parse().run();
    ExitCode::from(code as u8)
}
