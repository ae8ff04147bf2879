//! ledgerd CLI entry point.
//!
//! main.rs does nothing but parse args and dispatch: it never touches the
//! log, health map, or HTTP layer directly.

use std::process;

use ledgerd::cli::{run_command, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = run_command(cli.command).await {
        let error_json = serde_json::json!({
            "status": "error",
            "code": e.code_str(),
            "message": e.message()
        });

        eprintln!("{}", error_json);
        process::exit(1);
    }
}
