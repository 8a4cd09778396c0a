use crate::model::config_validation::DEFAULT_MIN_CONTENT_LENGTH_BYTES;

pub(crate) fn default_as_true() -> bool { true }

pub(crate) fn default_output() -> String { String::from("channels.m3u") }

pub(crate) fn default_cache_dir() -> String { String::from("cache") }

pub(crate) fn default_cache_lifespan_hours() -> u64 { 25 }

pub(crate) fn default_min_content_length() -> u64 { DEFAULT_MIN_CONTENT_LENGTH_BYTES }

pub(crate) fn default_check_timeout_secs() -> u64 { 10 }

pub(crate) fn default_source_timeout_secs() -> u64 { 120 }

pub(crate) fn default_check_concurrency() -> usize { 8 }
