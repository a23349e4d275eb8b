//! # Logi Console Entry Point
//!
//! Sets up logging and hands the arguments to [`logi_console::run`].
//! Command output goes to stdout, logs and errors to stderr.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    logi_console::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();

    match logi_console::run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error {}", e);
            ExitCode::from(e.code.exit_status())
        }
    }
}
