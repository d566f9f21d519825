use std::io;
use std::process::ExitCode;

use ixa_gridsir::runner::{parse_args, run_with_args, usage, Invocation};

fn main() -> ExitCode {
    let args = match parse_args(std::env::args_os()) {
        Ok(Invocation::Run(args)) => args,
        Ok(Invocation::Usage) => {
            println!("{}", usage());
            return ExitCode::SUCCESS;
        }
        Err(e) => e.exit(),
    };

    match run_with_args(&args, io::stdout().lock(), io::stderr().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        // The reader closed stdout early.
        Err(e) if e.is_broken_pipe() => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
