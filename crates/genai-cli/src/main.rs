mod bootstrap;
mod cli;
mod commands;
mod output;

use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if let Err(err) = cli.execute().await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
