use crate::info_err;
use crate::m3u_curator_error::M3uCuratorError;

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// A single selected channel. Its position in the configured list defines the output order.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigChannel {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_id: Option<String>,
    /// Consumed by the program guide processing, not by the playlist pipeline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epg_timeshift: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,
}

impl ConfigChannel {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            ..Default::default()
        }
    }

    pub fn prepare(&mut self, index: usize) -> Result<(), M3uCuratorError> {
        if self.id.is_empty() {
            return Err(info_err!("channel at position {} has no id", index));
        }
        self.group = non_empty(self.group.take());
        self.name = non_empty(self.name.take());
        self.epg_id = non_empty(self.epg_id.take());
        self.epg_timeshift = non_empty(self.epg_timeshift.take());
        self.logo = non_empty(self.logo.take());
        self.fallbacks.retain(|id| !id.is_empty() && id != &self.id);
        Ok(())
    }
}
