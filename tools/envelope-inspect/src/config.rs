use anyhow::{bail, Context};
use event_envelope::APPLICATION_JSON;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("unknown log format '{other}' (expected 'pretty' or 'json')"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Content types offered to codec negotiation, most preferred first
    pub accept: Vec<String>,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let accept = parse_accept(
            &lookup("ENVELOPE_ACCEPT").unwrap_or_else(|| APPLICATION_JSON.to_string()),
        );
        if accept.is_empty() {
            bail!("ENVELOPE_ACCEPT must name at least one content type");
        }

        let log_format = lookup("LOG_FORMAT")
            .unwrap_or_else(|| "pretty".to_string())
            .parse::<LogFormat>()
            .context("invalid LOG_FORMAT")?;

        Ok(Self { accept, log_format })
    }

    /// Apply command-line overrides on top of the environment
    pub fn with_overrides(
        mut self,
        accept: Option<Vec<String>>,
        log_format: Option<LogFormat>,
    ) -> Self {
        if let Some(accept) = accept.filter(|a| !a.is_empty()) {
            self.accept = accept;
        }
        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }
        self
    }

    pub fn accept_refs(&self) -> Vec<&str> {
        self.accept.iter().map(String::as_str).collect()
    }
}

fn parse_accept(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
