use crate::config::ExtractionConfig;
use crate::error::{M3uExtractError, Result};
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use url::{form_urlencoded, Url};

/// A username/password pair pulled out of a single URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new<U: Into<String>, P: Into<String>>(username: U, password: P) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// `username:password`, as stored in the combo file.
    pub fn combo(&self) -> String {
        format!("{}:{}", self.username, self.password)
    }

    /// True when either side contains the combo delimiter, making the combo line ambiguous.
    pub fn has_ambiguous_combo(&self) -> bool {
        self.username.contains(':') || self.password.contains(':')
    }
}

impl fmt::Display for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.combo())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Found(Credentials),
    NotFound,
}

/// Pulls credentials out of URLs: structured query parsing first, raw pattern search second.
pub struct CredentialExtractor {
    username_param: String,
    password_param: String,
    username_pattern: Regex,
    password_pattern: Regex,
}

impl CredentialExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            username_param: config.username_param.clone(),
            password_param: config.password_param.clone(),
            username_pattern: param_pattern(&config.username_param)?,
            password_pattern: param_pattern(&config.password_param)?,
        })
    }

    pub fn extract(&self, url: &str) -> Extraction {
        if let Some(credentials) = query_component(url).and_then(|query| self.from_query(&query)) {
            return Extraction::Found(credentials);
        }

        match self.from_patterns(url) {
            Some(credentials) => Extraction::Found(credentials),
            None => Extraction::NotFound,
        }
    }

    fn from_query(&self, query: &str) -> Option<Credentials> {
        // First occurrence wins, blank values are dropped.
        let mut params: HashMap<String, String> = HashMap::new();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            params
                .entry(key.into_owned())
                .or_insert_with(|| value.into_owned());
        }

        let username = params.remove(&self.username_param)?;
        let password = params.remove(&self.password_param)?;
        Some(Credentials { username, password })
    }

    fn from_patterns(&self, url: &str) -> Option<Credentials> {
        let username = capture_first(&self.username_pattern, url)?;
        let password = capture_first(&self.password_pattern, url)?;
        Some(Credentials::new(username, password))
    }
}

/// Raw query string of `url`. Lines the URL parser rejects (no scheme, bad port)
/// are split on `?` and `#` by hand so their values are decoded the same way.
fn query_component(url: &str) -> Option<String> {
    match Url::parse(url) {
        Ok(parsed) => parsed.query().map(str::to_string),
        Err(e) => {
            tracing::debug!(url, error = %e, "URL did not parse, splitting query by hand");
            let (_, rest) = url.split_once('?')?;
            rest.split('#').next().map(str::to_string)
        }
    }
}

fn param_pattern(name: &str) -> Result<Regex> {
    Regex::new(&format!(r"{}=([^&\s]+)", regex::escape(name))).map_err(|e| {
        M3uExtractError::Config {
            message: format!("Invalid parameter name {:?}: {}", name, e),
        }
    })
}

fn capture_first(pattern: &Regex, haystack: &str) -> Option<String> {
    pattern
        .captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}
