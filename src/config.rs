//! Decoder options

use serde::{Deserialize, Serialize};

use crate::{DecodeError, Result};

/// Options controlling how a volume is decoded and queried
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Fail with [`DecodeError::MissingData`] when no message 5 is present
    #[serde(default)]
    pub require_vcp: bool,
    /// Column cap for `get_data` grids; `None` sizes to the widest radial
    #[serde(default)]
    pub max_ngates: Option<usize>,
    /// Log filter used by the command line tool
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            require_vcp: false,
            max_ngates: None,
            log_filter: default_log_filter(),
        }
    }
}

impl DecodeOptions {
    /// Load options from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DecodeError::Config(format!("Failed to read config file: {e}")))?;

        let options: Self = toml::from_str(&content)
            .map_err(|e| DecodeError::Config(format!("Failed to parse config: {e}")))?;

        options.validate()?;
        Ok(options)
    }

    /// Validate options
    ///
    /// # Errors
    ///
    /// Returns error if `max_ngates` is zero or the log filter is empty
    pub fn validate(&self) -> Result<()> {
        if self.max_ngates == Some(0) {
            return Err(DecodeError::Config(
                "max_ngates must be greater than 0 when set".to_string(),
            ));
        }

        if self.log_filter.trim().is_empty() {
            return Err(DecodeError::Config("log_filter cannot be empty".to_string()));
        }

        Ok(())
    }
}
