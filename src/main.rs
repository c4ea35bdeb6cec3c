use clap::Parser;
use m3u_extract::{Cli, M3uExtract, M3uExtractError, OutputFormatter, OutputMode, UserFriendlyError};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = setup_logging() {
        eprintln!("Failed to initialize logging: {:#}", e);
    }

    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let app = match M3uExtract::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return 1;
        }
    };

    // clap enforces --file unless --generate-config was given
    let Some(ref input_file) = cli.file else {
        return 1;
    };

    let summary = app.process_file(input_file);
    app.print_summary(&summary);

    0
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "m3u-extract.toml".to_string());

    match M3uExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  m3u-extract -f urls.txt --config {}", config_path);
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &M3uExtractError) {
    let formatter = OutputFormatter::new(OutputMode::Human, false);
    formatter.print_user_friendly_error(error);
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the default level.
fn setup_logging() -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("m3u_extract=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
