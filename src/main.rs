mod app;
mod cli;
mod commands;
mod config;
mod core;
mod credentials;
mod display;
mod input;
mod providers;
mod relay;
mod session;
mod utils;

use crate::app::Application;
use crate::cli::Args;
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut app = match Application::new(&args) {
        Ok(app) => app,
        Err(e) => {
            display::print_fatal(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.run().await {
        display::print_fatal(&e);
        std::process::exit(1);
    }
}
