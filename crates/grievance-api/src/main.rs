//! Grievance API CLI
//!
//! Starts the HTTP server for grievance filing and triage.

use grievance_api::{config::ApiConfig, start_server, ServerError};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<(), ServerError> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ApiConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Usage: grievance-api --config <path-to-config.toml>");
        process::exit(2);
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Grievance API - Municipal Grievance Filing and Triage");
    println!();
    println!("USAGE:");
    println!("    grievance-api --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    The TOML config file should contain:");
    println!("    - bind_address: IP address to bind (e.g., '127.0.0.1')");
    println!("    - bind_port: Port number (default: 8000)");
    println!("    - jwt_secret: Secret key for JWT token signing");
    println!("    - token_expiry_secs: Token expiry in seconds (default: 86400)");
    println!("    - database_path: SQLite file (default: grievances.db)");
    println!("    - [classifier] timeout_ms: Model call bound (default: 30000)");
    println!("    - [llm] endpoint, model, api_key (empty: GROQ_API_KEY)");
    println!("    - password_hash_cost: bcrypt cost for registrations (default: 12)");
    println!("    - [[accounts]] subject_id, role, departments, password_hash (bcrypt)");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG           Log filter (default: info)");
    println!("    GROQ_API_KEY       Model API key when none is configured");
    println!();
}
