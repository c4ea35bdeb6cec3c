use crate::error::{M3uExtractError, UserFriendlyError};
use crate::extractor::Credentials;
use crate::processor::RunSummary;
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static KEY: Emoji = Emoji("🔑 ", "+ ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported(),
            _ => false,
        };

        Self {
            mode,
            use_colors,
            quiet,
        }
    }

    /// Errors are shown even in quiet mode.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Warning, message),
            OutputMode::Json => self.print_json_message("warning", message),
            OutputMode::Plain => println!("WARNING: {}", message),
        }
    }

    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Info, message),
            OutputMode::Json => self.print_json_message("info", message),
            OutputMode::Plain => println!("INFO: {}", message),
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}{}", ROCKET, style(operation).bold());
                } else {
                    println!("> {}", operation);
                }
            }
            OutputMode::Json => self.print_json_message("operation_start", operation),
            OutputMode::Plain => println!("STARTING: {}", operation),
        }
    }

    // Per-line reporting, verbose mode only

    pub fn line_started(&self, line_number: usize, url: &str, preview_width: usize) {
        if self.quiet {
            return;
        }
        let preview = truncate_preview(url, preview_width);
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{} {}", style(format!("[{:>5}]", line_number)).dim(), preview);
                } else {
                    println!("[{:>5}] {}", line_number, preview);
                }
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "line",
                "line": line_number,
                "url": preview,
            })),
            OutputMode::Plain => println!("LINE {}: {}", line_number, preview),
        }
    }

    pub fn line_found(&self, line_number: usize, credentials: &Credentials) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("        {}{}", KEY, style(credentials.combo()).green());
                } else {
                    println!("        + {}", credentials.combo());
                }
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "found",
                "line": line_number,
                "credentials": credentials,
            })),
            OutputMode::Plain => println!("FOUND {}: {}", line_number, credentials.combo()),
        }
    }

    pub fn line_not_found(&self, line_number: usize) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("        {}", style("no credentials found").dim());
                } else {
                    println!("        - no credentials found");
                }
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "not_found",
                "line": line_number,
            })),
            OutputMode::Plain => println!("NOT FOUND {}", line_number),
        }
    }

    pub fn print_user_friendly_error(&self, error: &M3uExtractError) {
        self.error(&error.user_message());

        if self.quiet {
            return;
        }

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!(
                            "{}{}",
                            INFO,
                            style(format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        println!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => println!("SUGGESTION: {}", suggestion),
            }
        }
    }

    /// Final report. Printed regardless of quiet mode.
    pub fn print_run_summary(&self, summary: &RunSummary, output_dir: &Path) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(summary, output_dir),
            OutputMode::Json => self.print_json_summary(summary, output_dir),
            OutputMode::Plain => self.print_plain_summary(summary, output_dir),
        }
    }

    pub fn print_separator(&self) {
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => println!("{}", "-".repeat(60)),
            OutputMode::Json => {}
        }
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        if self.use_colors {
            let (emoji, styled) = match msg_type {
                MessageType::Error => (&CROSS, style(message).red().bold()),
                MessageType::Warning => (&WARNING, style(message).yellow().bold()),
                MessageType::Info => (&INFO, style(message).cyan()),
            };

            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, styled),
                _ => println!("{}{}", emoji, styled),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_summary(&self, summary: &RunSummary, output_dir: &Path) {
        println!();
        self.print_separator();

        let headline = summary.headline();
        if self.use_colors {
            let styled = if summary.successful > 0 {
                style(headline).green().bold()
            } else {
                style(headline).yellow().bold()
            };
            println!("{}{}", CHECKMARK, styled);
        } else {
            println!("{}", headline);
        }

        println!("  Output directory: {}", output_dir.display());
        println!("  Time taken:       {}", format_duration(summary.duration));

        if summary.interrupted {
            println!("  Stopped early:    interrupted by user");
        }
        if !summary.errors.is_empty() {
            println!("  Errors:           {}", summary.errors.len());
            for error in &summary.errors {
                println!("    - {}", error);
            }
        }

        self.print_separator();
    }

    fn print_json_summary(&self, summary: &RunSummary, output_dir: &Path) {
        let report = serde_json::json!({
            "type": "summary",
            "successful": summary.successful,
            "total": summary.total,
            "interrupted": summary.interrupted,
            "errors": summary.errors,
            "duration_ms": summary.duration.as_millis() as u64,
            "output_directory": output_dir.display().to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_plain_summary(&self, summary: &RunSummary, output_dir: &Path) {
        println!("{}", summary.headline());
        println!("Output: {}", output_dir.display());
        if summary.interrupted {
            println!("Interrupted: yes");
        }
        if !summary.errors.is_empty() {
            println!("Errors: {}", summary.errors.len());
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Error,
    Warning,
    Info,
}

/// Cuts `url` to at most `width` characters, marking the cut with `...`.
pub fn truncate_preview(url: &str, width: usize) -> String {
    match url.char_indices().nth(width) {
        Some((byte_index, _)) => format!("{}...", &url[..byte_index]),
        None => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_mode() {
        let formatter = OutputFormatter::new(OutputMode::Plain, true);
        assert!(formatter.quiet);
        assert!(!formatter.use_colors);
    }

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("short", 80), "short");

        let exact = "a".repeat(80);
        assert_eq!(truncate_preview(&exact, 80), exact);

        let long = "b".repeat(81);
        assert_eq!(truncate_preview(&long, 80), format!("{}...", "b".repeat(80)));
    }

    #[test]
    fn test_truncate_preview_counts_chars() {
        let url = "é".repeat(10);
        assert_eq!(truncate_preview(&url, 3), "ééé...");
    }
}
