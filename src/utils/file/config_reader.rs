use std::env;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::info_err;
use crate::m3u_curator_error::M3uCuratorError;
use crate::model::Config;

static ENV_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$\{env:(?P<var>[a-zA-Z_][a-zA-Z0-9_]*)}").unwrap());

pub fn resolve_env_var(value: &str) -> String {
    ENV_REGEX.replace_all(value, |caps: &regex::Captures| {
        let var_name = &caps["var"];
        env::var(var_name).unwrap_or_else(|_| format!("${{env:{var_name}}}"))
    }).to_string()
}

/// Deserializes the yaml text, no `prepare` is applied.
pub fn parse_config(content: &str) -> Result<Config, M3uCuratorError> {
    serde_yaml::from_str::<Config>(&resolve_env_var(content))
        .map_err(|err| info_err!("cant read config file: {}", err))
}

pub fn read_config(config_file: &str) -> Result<Config, M3uCuratorError> {
    debug!("reading config file {config_file}");
    let content = std::fs::read_to_string(config_file)
        .map_err(|err| info_err!("cant read config file {}: {}", config_file, err))?;
    parse_config(&content)
}
