use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "rawhttp")]
#[command(about = "Minimal HTTP/1.1 server with echo, user-agent and file routes")]
#[command(version)]
pub struct Args {
    /// Directory served and written by the /files/ routes
    #[arg(long, value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Address to listen on [default: 0.0.0.0:4221]
    #[arg(short, long, value_name = "ADDR")]
    pub listen: Option<String>,

    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Largest request (head and body) accepted on a connection
    #[arg(long, value_name = "BYTES")]
    pub max_request_bytes: Option<usize>,

    /// Log filter used when RUST_LOG is not set (e.g. "debug", "rawhttp=trace")
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
