use std::path::PathBuf;

use log::debug;

use crate::info_err;
use crate::m3u_curator_error::M3uCuratorError;
use crate::model::{ConfigCache, ConfigChannel, ConfigGroup, ConfigPlugin, ConfigValidation, LogConfig};
use crate::model::config_channel::non_empty;
use crate::utils::{default_output, default_source_timeout_secs, file_utils};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub working_dir: String,
    /// playlist source: local path, `file://` or `http(s)://` url
    #[serde(default)]
    pub source: String,
    #[serde(default = "default_output")]
    pub output: String,
    /// upper bound for downloading a remote source
    #[serde(default = "default_source_timeout_secs")]
    pub source_timeout_secs: u64,
    #[serde(default)]
    pub compress: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_group: Option<String>,
    #[serde(default)]
    pub channels: Vec<ConfigChannel>,
    #[serde(default)]
    pub groups: Vec<ConfigGroup>,
    #[serde(default)]
    pub validation: ConfigValidation,
    #[serde(default)]
    pub cache: ConfigCache,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log: Option<LogConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<ConfigPlugin>,
    #[serde(skip)]
    pub t_output_path: PathBuf,
    #[serde(skip)]
    pub t_cache_dir: PathBuf,
}

impl Config {
    pub fn prepare(&mut self) -> Result<(), M3uCuratorError> {
        if self.source.trim().is_empty() {
            return Err(info_err!("no playlist source configured"));
        }
        if self.channels.is_empty() && self.groups.is_empty() {
            return Err(info_err!("neither channels nor groups configured"));
        }
        self.working_dir = file_utils::get_working_path(&self.working_dir);
        debug!("working dir: {}", self.working_dir);
        if self.output.trim().is_empty() {
            self.output = default_output();
        }
        self.t_output_path = file_utils::get_file_path(&self.working_dir, Some(PathBuf::from(&self.output)))
            .unwrap_or_else(|| PathBuf::from(&self.output));
        self.t_cache_dir = file_utils::get_file_path(&self.working_dir, Some(PathBuf::from(&self.cache.dir)))
            .unwrap_or_else(|| PathBuf::from(&self.cache.dir));
        self.default_group = non_empty(self.default_group.take());
        if self.source_timeout_secs == 0 {
            self.source_timeout_secs = default_source_timeout_secs();
        }

        for (index, channel) in self.channels.iter_mut().enumerate() {
            channel.prepare(index)?;
        }
        for (index, group) in self.groups.iter_mut().enumerate() {
            group.prepare(index)?;
        }
        self.validation.prepare();
        Ok(())
    }

    pub fn sanitize_sensitive_info(&self) -> bool {
        self.log.as_ref().map_or(true, |log| log.sanitize_sensitive_info)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.log_level.as_deref())
    }
}
