//! CursorPro packager - builds and publishes platform release artifacts.
//!
//! Exit code 0 only when every artifact was built and the release published.

use cursorpro_packager::cli;
use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging; RUST_LOG overrides the default filter
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            cli::EXIT_FAILURE
        }
    };

    process::exit(exit_code);
}
