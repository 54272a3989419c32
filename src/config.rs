//! Layer settings.
//!
//! A single optional value, `aspect` under `[Settings]`, read from an INI
//! file next to the log. Section and key names match case-insensitively,
//! other sections and keys are ignored, and the first `aspect` wins.
//! Anything missing, malformed or out of range falls back to 16:9;
//! configuration problems never stop the layer.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::aspect::TargetAspect;
use crate::gate::AllowList;

const SECTION: &str = "Settings";
const ASPECT_KEY: &str = "aspect";

/// Error reading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading the settings file.
    #[error("failed to read settings file: {0}")]
    Io(#[from] io::Error),

    /// `aspect` is text that does not parse as a number.
    #[error("aspect value {0:?} is not a number")]
    NotANumber(String),
}

/// Where the `aspect` setting comes from.
pub trait ConfigSource {
    /// The configured aspect, `Ok(None)` when not configured.
    fn read_aspect(&self) -> Result<Option<f64>, ConfigError>;
}

/// Settings file on disk. A missing file is "not configured".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IniFile {
    path: PathBuf,
}

impl IniFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for IniFile {
    fn read_aspect(&self) -> Result<Option<f64>, ConfigError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no settings file");
                return Ok(None);
            }
            Err(err) => return Err(ConfigError::Io(err)),
        };
        parse_aspect(&content)
    }
}

/// Settings held in memory.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ConfigText<'a>(pub &'a str);

impl ConfigSource for ConfigText<'_> {
    fn read_aspect(&self) -> Result<Option<f64>, ConfigError> {
        parse_aspect(self.0)
    }
}

/// Extract `[Settings] aspect` from INI text. A quoted value is parsed as a
/// number too.
pub fn parse_aspect(content: &str) -> Result<Option<f64>, ConfigError> {
    let Some(value) = ini_value(content, SECTION, ASPECT_KEY) else {
        return Ok(None);
    };
    let text = unquote(value).trim();
    text.parse()
        .map(Some)
        .map_err(|_| ConfigError::NotANumber(text.to_owned()))
}

/// First value of `key` inside any `[section]`, names compared
/// ASCII-case-insensitively.
fn ini_value<'a>(content: &'a str, section: &str, key: &str) -> Option<&'a str> {
    let mut in_section = false;
    for line in content.trim_start_matches('\u{feff}').lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            in_section = header
                .strip_suffix(']')
                .is_some_and(|name| name.trim().eq_ignore_ascii_case(section));
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((name, value)) = line.split_once('=')
            && name.trim().eq_ignore_ascii_case(key)
        {
            return Some(value.trim());
        }
    }
    None
}

/// Drop a `;` or `#` comment: a whole line, or inline after whitespace.
fn strip_comment(line: &str) -> &str {
    let mut previous_blank = true;
    for (index, c) in line.char_indices() {
        if (c == ';' || c == '#') && previous_blank {
            return &line[..index];
        }
        previous_blank = c.is_whitespace();
    }
    line
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .into_iter()
        .find_map(|quote| {
            value
                .strip_prefix(quote)
                .and_then(|inner| inner.strip_suffix(quote))
        })
        .unwrap_or(value)
}

/// Immutable settings for the life of the process.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LayerSettings {
    pub aspect: TargetAspect,
    pub allow_list: AllowList,
}

impl LayerSettings {
    /// Read settings from `source`, falling back to defaults on any problem.
    pub fn load(source: &dyn ConfigSource) -> Self {
        let aspect = match source.read_aspect() {
            Ok(None) => TargetAspect::default(),
            Ok(Some(value)) => match TargetAspect::new(value) {
                Ok(aspect) => aspect,
                Err(error) => {
                    warn!(%error, "ignoring configured aspect, using 16:9");
                    TargetAspect::default()
                }
            },
            Err(error) => {
                warn!(%error, "ignoring settings, using 16:9");
                TargetAspect::default()
            }
        };
        info!(%aspect, "target aspect");
        Self {
            aspect,
            allow_list: AllowList::default(),
        }
    }
}
