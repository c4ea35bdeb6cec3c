use crate::config::Config;
use crate::error::{M3uExtractError, Result, UserFriendlyError};
use crate::extractor::{CredentialExtractor, CredentialWriter, Extraction};
use crate::ui::progress::{finish_progress_with_summary, update_line_progress};
use crate::ui::{GracefulShutdown, OutputFormatter, ProgressManager};
use indicatif::ProgressBar;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::{Duration, Instant};

/// Counts for one pass over an input file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub successful: usize,
    /// Every line read, blank ones included.
    pub total: usize,
    pub interrupted: bool,
    pub errors: Vec<String>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn headline(&self) -> String {
        format!("{}/{} credentials extracted", self.successful, self.total)
    }
}

/// Console plumbing shared by a run: where to report, how to show progress, when to stop.
pub struct RunContext<'a> {
    pub formatter: &'a OutputFormatter,
    pub progress: &'a ProgressManager,
    pub shutdown: &'a GracefulShutdown,
}

pub struct FileProcessor {
    extractor: CredentialExtractor,
    writer: CredentialWriter,
    preview_width: usize,
}

impl FileProcessor {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            extractor: CredentialExtractor::new(&config.extraction)?,
            writer: CredentialWriter::new(&config.output),
            preview_width: config.extraction.preview_width,
        })
    }

    /// Never fails: a missing input, a read error or an interrupt all end the run
    /// early and are recorded on the returned summary.
    pub fn process_file(&self, input_file: &Path, ctx: &RunContext<'_>) -> RunSummary {
        match open_input(input_file) {
            Ok(reader) => self.process_reader(reader, ctx),
            Err(e) => {
                let mut summary = RunSummary::default();
                report_failure(&e, ctx, &mut summary);
                summary
            }
        }
    }

    fn process_reader<R: BufRead>(&self, reader: R, ctx: &RunContext<'_>) -> RunSummary {
        let start_time = Instant::now();
        let mut summary = RunSummary::default();
        let pb = ctx.progress.create_line_progress();

        let outcome = self.process_lines(reader, ctx, &pb, &mut summary);

        finish_progress_with_summary(
            &pb,
            &format!("Processed {} lines", summary.total),
            pb.elapsed(),
        );

        match outcome {
            Ok(()) => {}
            Err(M3uExtractError::Cancelled) => {
                summary.interrupted = true;
                tracing::info!(lines = summary.total, "run interrupted");
                ctx.formatter
                    .warning("Ctrl-C pressed, returning partial results");
            }
            Err(e) => report_failure(&e, ctx, &mut summary),
        }

        summary.duration = start_time.elapsed();
        summary
    }

    fn process_lines<R: BufRead>(
        &self,
        reader: R,
        ctx: &RunContext<'_>,
        pb: &ProgressBar,
        summary: &mut RunSummary,
    ) -> Result<()> {
        for (index, line) in reader.lines().enumerate() {
            ctx.shutdown.check_shutdown()?;

            let line_number = index + 1;
            let line = line.map_err(|source| M3uExtractError::Read {
                line: line_number,
                source,
            })?;
            summary.total += 1;

            let url = line.trim_end();
            if url.is_empty() {
                update_line_progress(pb, summary.total, summary.successful);
                continue;
            }

            pb.suspend(|| ctx.formatter.line_started(line_number, url, self.preview_width));

            match self.extractor.extract(url) {
                Extraction::Found(credentials) => match self.writer.save(&credentials) {
                    Ok(()) => {
                        summary.successful += 1;
                        pb.suspend(|| ctx.formatter.line_found(line_number, &credentials));
                    }
                    Err(e) => {
                        tracing::warn!(line = line_number, error = %e, "failed to save credentials");
                        pb.suspend(|| ctx.formatter.print_user_friendly_error(&e));
                        summary
                            .errors
                            .push(format!("line {}: {}", line_number, e.user_message()));
                    }
                },
                Extraction::NotFound => {
                    tracing::debug!(line = line_number, "no credentials found");
                    pb.suspend(|| ctx.formatter.line_not_found(line_number));
                }
            }

            update_line_progress(pb, summary.total, summary.successful);
        }

        Ok(())
    }
}

fn open_input(input_file: &Path) -> Result<BufReader<File>> {
    if !input_file.is_file() {
        return Err(M3uExtractError::InputNotFound {
            path: input_file.display().to_string(),
        });
    }

    Ok(BufReader::new(File::open(input_file)?))
}

fn report_failure(error: &M3uExtractError, ctx: &RunContext<'_>, summary: &mut RunSummary) {
    tracing::error!(error = %error, "run aborted");
    ctx.formatter.print_user_friendly_error(error);
    summary.errors.push(error.user_message());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::OutputMode;
    use std::fs;
    use tempfile::TempDir;

    struct Harness {
        formatter: OutputFormatter,
        progress: ProgressManager,
        shutdown: GracefulShutdown,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                formatter: OutputFormatter::new(OutputMode::Plain, true),
                progress: ProgressManager::new(false),
                shutdown: GracefulShutdown::new_for_test(),
            }
        }

        fn ctx(&self) -> RunContext<'_> {
            RunContext {
                formatter: &self.formatter,
                progress: &self.progress,
                shutdown: &self.shutdown,
            }
        }
    }

    fn processor_for(output_dir: &Path) -> FileProcessor {
        let mut config = Config::default();
        config.output.directory = output_dir.to_path_buf();
        FileProcessor::new(&config).unwrap()
    }

    #[test]
    fn test_two_line_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        fs::write(
            &input,
            "http://x/get.php?username=test&password=pass123&type=m3u\nhttp://x/get.php?foo=bar\n",
        )
        .unwrap();
        let out = temp_dir.path().join("out");

        let harness = Harness::new();
        let summary = processor_for(&out).process_file(&input, &harness.ctx());

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.total, 2);
        assert!(!summary.interrupted);
        assert!(summary.errors.is_empty());
        assert_eq!(fs::read_to_string(out.join("usernames.txt")).unwrap(), "test\n");
        assert_eq!(fs::read_to_string(out.join("passwords.txt")).unwrap(), "pass123\n");
        assert_eq!(fs::read_to_string(out.join("combo.txt")).unwrap(), "test:pass123\n");
    }

    #[test]
    fn test_missing_input_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let out = temp_dir.path().join("out");

        let harness = Harness::new();
        let summary =
            processor_for(&out).process_file(&temp_dir.path().join("nope.txt"), &harness.ctx());

        assert_eq!((summary.successful, summary.total), (0, 0));
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("nope.txt"));
        assert!(!out.exists());
    }

    #[test]
    fn test_blank_lines_count_toward_total_only() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        fs::write(
            &input,
            "\nhttp://a/?username=u1&password=p1\n   \nhttp://b/?username=u2&password=p2  \r\n",
        )
        .unwrap();

        let harness = Harness::new();
        let summary = processor_for(temp_dir.path()).process_file(&input, &harness.ctx());

        assert_eq!(summary.successful, 2);
        assert_eq!(summary.total, 4);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("combo.txt")).unwrap(),
            "u1:p1\nu2:p2\n"
        );
    }

    #[test]
    fn test_runs_append_to_existing_output() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        fs::write(&input, "http://a/?username=u&password=p\n").unwrap();

        let harness = Harness::new();
        let processor = processor_for(temp_dir.path());
        processor.process_file(&input, &harness.ctx());
        processor.process_file(&input, &harness.ctx());

        assert_eq!(
            fs::read_to_string(temp_dir.path().join("usernames.txt")).unwrap(),
            "u\nu\n"
        );
    }

    #[test]
    fn test_interrupt_stops_before_next_line() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        fs::write(&input, "http://a/?username=u&password=p\n").unwrap();

        let harness = Harness::new();
        harness.shutdown.request_shutdown();
        let summary = processor_for(temp_dir.path()).process_file(&input, &harness.ctx());

        assert!(summary.interrupted);
        assert_eq!((summary.successful, summary.total), (0, 0));
        assert!(summary.errors.is_empty());
        assert!(!temp_dir.path().join("combo.txt").exists());
    }

    /// Serves one line per `fill_buf` and raises the shutdown flag once
    /// `interrupt_after` lines have been handed out.
    struct InterruptingReader<'a> {
        lines: Vec<&'static [u8]>,
        current: usize,
        offset: usize,
        interrupt_after: usize,
        shutdown: &'a GracefulShutdown,
    }

    impl std::io::Read for InterruptingReader<'_> {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let available = self.fill_buf()?;
            let n = available.len().min(buf.len());
            buf[..n].copy_from_slice(&available[..n]);
            self.consume(n);
            Ok(n)
        }
    }

    impl BufRead for InterruptingReader<'_> {
        fn fill_buf(&mut self) -> std::io::Result<&[u8]> {
            Ok(match self.lines.get(self.current) {
                Some(line) => &line[self.offset..],
                None => &[][..],
            })
        }

        fn consume(&mut self, amt: usize) {
            self.offset += amt;
            if let Some(line) = self.lines.get(self.current) {
                if self.offset >= line.len() {
                    self.current += 1;
                    self.offset = 0;
                    if self.current == self.interrupt_after {
                        self.shutdown.request_shutdown();
                    }
                }
            }
        }
    }

    #[test]
    fn test_interrupt_mid_run_keeps_partial_counts() {
        let temp_dir = TempDir::new().unwrap();
        let harness = Harness::new();
        // Line 2 is read before the flag is checked, so raising it as line 2
        // arrives stops the run after line 1 has been written.
        let reader = InterruptingReader {
            lines: vec![
                &b"http://a/?username=u1&password=p1\n"[..],
                &b"http://b/?username=u2&password=p2\n"[..],
                &b"http://c/?username=u3&password=p3\n"[..],
            ],
            current: 0,
            offset: 0,
            interrupt_after: 2,
            shutdown: &harness.shutdown,
        };

        let summary = processor_for(temp_dir.path()).process_reader(reader, &harness.ctx());

        assert!(summary.interrupted);
        assert_eq!((summary.successful, summary.total), (1, 1));
        assert!(summary.errors.is_empty());
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("combo.txt")).unwrap(),
            "u1:p1\n"
        );
    }

    #[test]
    fn test_invalid_utf8_aborts_with_partial_counts() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        let mut content = b"http://a/?username=u&password=p\n".to_vec();
        content.extend_from_slice(&[0xff, 0xfe, b'\n']);
        content.extend_from_slice(b"http://b/?username=v&password=q\n");
        fs::write(&input, content).unwrap();

        let harness = Harness::new();
        let summary = processor_for(temp_dir.path()).process_file(&input, &harness.ctx());

        assert_eq!((summary.successful, summary.total), (1, 1));
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("line 2"));
    }

    #[test]
    fn test_write_failure_is_not_counted() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("urls.txt");
        fs::write(&input, "http://a/?username=u&password=p\nhttp://x/?foo=bar\n").unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not dir").unwrap();

        let harness = Harness::new();
        let summary = processor_for(&blocker).process_file(&input, &harness.ctx());

        assert_eq!((summary.successful, summary.total), (0, 2));
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].starts_with("line 1:"));
    }

    #[test]
    fn test_headline() {
        let summary = RunSummary {
            successful: 3,
            total: 7,
            ..RunSummary::default()
        };
        assert_eq!(summary.headline(), "3/7 credentials extracted");
    }
}
