use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "m3u-extract")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Extract usernames and passwords from get.php?username=...&password=... links")]
#[command(
    long_about = "m3u-extract reads a file of URLs, one per line, pulls the username and password \
                  query parameters out of each, and appends them to usernames.txt, passwords.txt \
                  and combo.txt in the output directory."
)]
#[command(after_help = "EXAMPLES:\n  \
    m3u-extract -f urls.txt\n  \
    m3u-extract -f urls.txt -o results --quiet\n  \
    m3u-extract -f urls.txt --output-format json\n  \
    m3u-extract --generate-config --config m3u-extract.toml")]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// File of URLs, one per line
    #[arg(short, long, required_unless_present = "generate_config")]
    pub file: Option<PathBuf>,

    /// Output directory for usernames.txt, passwords.txt and combo.txt (default: .)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Suppress per-line logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Write a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_output_dir(self.output.clone())
    }
}
