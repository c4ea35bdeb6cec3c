pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod processor;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{CliOverrides, Config, ExtractionConfig, OutputConfig};
pub use error::{M3uExtractError, Result, UserFriendlyError};

pub use extractor::{CredentialExtractor, CredentialWriter, Credentials, Extraction};
pub use processor::{FileProcessor, RunContext, RunSummary};
pub use ui::{GracefulShutdown, OutputFormatter, OutputMode, ProgressManager};

use std::path::{Path, PathBuf};

/// Main library interface: one configured extraction run over an input file.
pub struct M3uExtract {
    config: Config,
    processor: FileProcessor,
    output_formatter: OutputFormatter,
    progress_manager: ProgressManager,
    shutdown: GracefulShutdown,
}

impl M3uExtract {
    /// Create a new instance, installing the Ctrl+C handler
    pub fn new(config: Config, output_mode: OutputMode, quiet: bool) -> Result<Self> {
        Self::with_shutdown(config, output_mode, quiet, GracefulShutdown::new()?)
    }

    /// Create an instance without touching process signal handlers
    #[cfg(test)]
    pub fn new_for_test(config: Config, output_mode: OutputMode, quiet: bool) -> Result<Self> {
        Self::with_shutdown(config, output_mode, quiet, GracefulShutdown::new_for_test())
    }

    fn with_shutdown(
        config: Config,
        output_mode: OutputMode,
        quiet: bool,
        shutdown: GracefulShutdown,
    ) -> Result<Self> {
        config.validate()?;
        let processor = FileProcessor::new(&config)?;

        // Per-line messages go to stdout; the spinner only makes sense for humans.
        let show_progress = !quiet && output_mode == OutputMode::Human;

        Ok(Self {
            config,
            processor,
            output_formatter: OutputFormatter::new(output_mode, quiet),
            progress_manager: ProgressManager::new(show_progress),
            shutdown,
        })
    }

    /// Create an instance from parsed CLI arguments
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Self::new(config, output_mode, cli_args.quiet)
    }

    /// Extract credentials from every line of `input_file` into the configured output directory
    pub fn process_file<P: AsRef<Path>>(&self, input_file: P) -> RunSummary {
        let input_file = input_file.as_ref();
        self.output_formatter.start_operation(&format!(
            "Extracting credentials from {}",
            input_file.display()
        ));
        self.output_formatter.info(&format!(
            "Appending results to {}",
            self.absolute_output_dir().display()
        ));
        tracing::info!(
            input = %input_file.display(),
            output = %self.config.output.directory.display(),
            "starting run"
        );

        let ctx = RunContext {
            formatter: &self.output_formatter,
            progress: &self.progress_manager,
            shutdown: &self.shutdown,
        };
        let summary = self.processor.process_file(input_file, &ctx);

        tracing::info!(
            successful = summary.successful,
            total = summary.total,
            interrupted = summary.interrupted,
            "run finished"
        );
        summary
    }

    /// Absolute form of the output directory, whether or not it exists yet
    pub fn absolute_output_dir(&self) -> PathBuf {
        let dir = &self.config.output.directory;
        std::path::absolute(dir).unwrap_or_else(|_| dir.clone())
    }

    pub fn print_summary(&self, summary: &RunSummary) {
        self.output_formatter
            .print_run_summary(summary, &self.absolute_output_dir());
    }

    /// Generate sample configuration file
    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }
}
