use crate::error::{M3uExtractError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub username_param: String,
    pub password_param: String,
    /// Maximum number of characters of a URL echoed in verbose progress lines
    pub preview_width: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub usernames_file: String,
    pub passwords_file: String,
    pub combo_file: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            username_param: "username".to_string(),
            password_param: "password".to_string(),
            preview_width: 80,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            usernames_file: "usernames.txt".to_string(),
            passwords_file: "passwords.txt".to_string(),
            combo_file: "combo.txt".to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(M3uExtractError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| M3uExtractError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| M3uExtractError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["m3u-extract.toml", ".m3u-extract.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref output_dir) = cli_args.output_dir {
            self.output.directory = output_dir.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let names = [
            ("extraction.username_param", &self.extraction.username_param),
            ("extraction.password_param", &self.extraction.password_param),
            ("output.usernames_file", &self.output.usernames_file),
            ("output.passwords_file", &self.output.passwords_file),
            ("output.combo_file", &self.output.combo_file),
        ];

        for (key, value) in names {
            if value.trim().is_empty() {
                return Err(M3uExtractError::Config {
                    message: format!("{} must not be empty", key),
                });
            }
        }

        if self.extraction.username_param == self.extraction.password_param {
            return Err(M3uExtractError::Config {
                message: "Username and password parameters must differ".to_string(),
            });
        }

        if self.extraction.preview_width == 0 {
            return Err(M3uExtractError::Config {
                message: "Preview width must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}
