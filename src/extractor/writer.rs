use crate::config::OutputConfig;
use crate::error::{M3uExtractError, Result};
use crate::extractor::Credentials;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends credentials to the usernames, passwords and combo files of an output directory.
pub struct CredentialWriter {
    output_dir: PathBuf,
    usernames_file: String,
    passwords_file: String,
    combo_file: String,
}

impl CredentialWriter {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            output_dir: config.directory.clone(),
            usernames_file: config.usernames_file.clone(),
            passwords_file: config.passwords_file.clone(),
            combo_file: config.combo_file.clone(),
        }
    }

    pub fn usernames_path(&self) -> PathBuf {
        self.output_dir.join(&self.usernames_file)
    }

    pub fn passwords_path(&self) -> PathBuf {
        self.output_dir.join(&self.passwords_file)
    }

    pub fn combo_path(&self) -> PathBuf {
        self.output_dir.join(&self.combo_file)
    }

    /// Appends one record to each file. Files are written in order, so a failure
    /// part-way leaves the earlier files updated.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| M3uExtractError::Write {
            path: self.output_dir.display().to_string(),
            source: e,
        })?;

        if credentials.has_ambiguous_combo() {
            tracing::warn!(
                combo = %credentials.combo(),
                "credential contains ':', combo line is ambiguous"
            );
        }

        append_line(&self.usernames_path(), &credentials.username)?;
        append_line(&self.passwords_path(), &credentials.password)?;
        append_line(&self.combo_path(), &credentials.combo())?;

        Ok(())
    }
}

fn append_line(path: &Path, line: &str) -> Result<()> {
    let to_write_error = |e: std::io::Error| M3uExtractError::Write {
        path: path.display().to_string(),
        source: e,
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_write_error)?;

    writeln!(file, "{}", line).map_err(to_write_error)
}
