use std::fmt::Display;
use enum_iterator::Sequence;

/// Points in a run where registered plugins get control.
#[derive(Debug, Copy, Clone, serde::Serialize, serde::Deserialize, Sequence, PartialEq, Eq, Hash)]
pub enum PluginStage {
    #[serde(rename = "application_start")]
    ApplicationStart,
    #[serde(rename = "channels_before")]
    ChannelsBefore,
    #[serde(rename = "channels_after")]
    ChannelsAfter,
    #[serde(rename = "application_finished")]
    ApplicationFinished,
}

impl PluginStage {
    const APPLICATION_START: &'static str = "application_start";
    const CHANNELS_BEFORE: &'static str = "channels_before";
    const CHANNELS_AFTER: &'static str = "channels_after";
    const APPLICATION_FINISHED: &'static str = "application_finished";
}

impl Display for PluginStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::ApplicationStart => Self::APPLICATION_START,
            Self::ChannelsBefore => Self::CHANNELS_BEFORE,
            Self::ChannelsAfter => Self::CHANNELS_AFTER,
            Self::ApplicationFinished => Self::APPLICATION_FINISHED,
        })
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigPlugin {
    pub name: String,
    pub stage: PluginStage,
    #[serde(default)]
    pub priority: i32,
    /// plugin specific, checked by the plugin factory
    #[serde(default)]
    pub settings: serde_json::Value,
}
