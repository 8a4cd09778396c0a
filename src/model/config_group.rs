use std::collections::HashSet;
use crate::info_err;
use crate::m3u_curator_error::M3uCuratorError;
use crate::model::config_channel::non_empty;

/// Selects every playlist entry whose group title equals `id`.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigGroup {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub exclude: HashSet<String>,
}

impl ConfigGroup {
    pub fn prepare(&mut self, index: usize) -> Result<(), M3uCuratorError> {
        if self.id.is_empty() {
            return Err(info_err!("group at position {} has no id", index));
        }
        self.name = non_empty(self.name.take());
        Ok(())
    }

    /// Group title used for every item of this group.
    pub fn title(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}
