use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the application config file
    #[arg(short, long, default_value = "config.json")]
    pub config: PathBuf,

    /// Model to start with (defaults to the first configured model)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Sampling temperature (0.0 to 1.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,
}
