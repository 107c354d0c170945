use access_log_query::AppError;
use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    match access_log_query::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match &err {
                // clap renders help, version and usage errors itself
                AppError::Usage(e) => {
                    let _ = e.print();
                }
                other => eprintln!("{} {}", "error:".red().bold(), other),
            }
            ExitCode::from(err.exit_code())
        }
    }
}
