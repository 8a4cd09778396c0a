use crate::utils::{default_cache_dir, default_cache_lifespan_hours};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigCache {
    #[serde(default)]
    pub enabled: bool,
    /// hours a downloaded source stays valid
    #[serde(default = "default_cache_lifespan_hours")]
    pub lifespan: u64,
    #[serde(default = "default_cache_dir")]
    pub dir: String,
}

impl Default for ConfigCache {
    fn default() -> Self {
        Self {
            enabled: false,
            lifespan: default_cache_lifespan_hours(),
            dir: default_cache_dir(),
        }
    }
}
