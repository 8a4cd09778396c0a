use indexmap::IndexMap;
use log::warn;
use crate::utils::{default_min_content_length, default_check_concurrency, default_check_timeout_secs};

pub const DEFAULT_MIN_CONTENT_LENGTH_BYTES: u64 = 100_000;
/// Upper bound for the check size, whatever is configured.
pub const MAX_CONTENT_LENGTH_BYTES: u64 = 5 * 1_048_576;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigValidation {
    /// validate configured single channels
    #[serde(default)]
    pub streams: bool,
    /// validate channels selected through groups
    #[serde(default)]
    pub groups: bool,
    #[serde(default)]
    pub show_invalid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_types: Vec<String>,
    #[serde(default = "default_min_content_length")]
    pub min_content_length: u64,
    #[serde(default = "default_check_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_check_concurrency")]
    pub concurrency: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_secs: Option<u64>,
    /// pattern -> substitutes, tried in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub default_fallbacks: IndexMap<String, Vec<String>>,
}

impl Default for ConfigValidation {
    fn default() -> Self {
        Self {
            streams: false,
            groups: false,
            show_invalid: false,
            content_types: vec![],
            min_content_length: default_min_content_length(),
            timeout_secs: default_check_timeout_secs(),
            concurrency: default_check_concurrency(),
            deadline_secs: None,
            default_fallbacks: IndexMap::new(),
        }
    }
}

impl ConfigValidation {
    pub fn prepare(&mut self) {
        if self.min_content_length > MAX_CONTENT_LENGTH_BYTES {
            warn!("validation min_content_length {} exceeds maximum, using {MAX_CONTENT_LENGTH_BYTES}", self.min_content_length);
            self.min_content_length = MAX_CONTENT_LENGTH_BYTES;
        }
        if self.timeout_secs == 0 {
            self.timeout_secs = default_check_timeout_secs();
        }
        self.concurrency = self.concurrency.max(1);
        self.content_types = self.content_types.iter()
            .map(|ct| ct.trim().to_lowercase())
            .filter(|ct| !ct.is_empty())
            .collect();
        if self.default_fallbacks.contains_key("") {
            warn!("ignoring default fallback with empty pattern");
            self.default_fallbacks.shift_remove("");
        }
    }

    pub const fn is_enabled(&self) -> bool {
        self.streams || self.groups
    }
}
