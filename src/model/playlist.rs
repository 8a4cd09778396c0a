use std::fmt::Display;
use indexmap::IndexMap;

/// One `#EXTINF` / url line pair of a source playlist.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct PlaylistEntry {
    /// `tvg-name`, unique inside one parsed playlist
    pub id: String,
    pub group_title: String,
    pub epg_id: String,
    pub logo: String,
    pub url: String,
}

/// Parsed playlist keyed by entry id, in source order.
pub type PlaylistIndex = IndexMap<String, PlaylistEntry>;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub enum Validity {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

impl Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", match self {
            Self::Unknown => "unknown",
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        })
    }
}

/// Index of the configuration entry an item was produced for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize)]
pub enum ItemOrigin {
    Channel(usize),
    Group(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedItem {
    pub id: String,
    pub group_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friendly_name: Option<String>,
    pub epg_id: String,
    pub logo: String,
    /// true when the logo differs from the one the source provided
    pub has_custom_logo: bool,
    pub url: String,
    pub order: usize,
    pub validity: Validity,
    pub origin: ItemOrigin,
}

impl ResolvedItem {
    pub fn display_name(&self) -> &str {
        self.friendly_name.as_deref().unwrap_or(&self.id)
    }

    pub const fn is_invalid(&self) -> bool {
        matches!(self.validity, Validity::Invalid)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ResolutionResult {
    /// sorted by `order`
    pub items: Vec<ResolvedItem>,
    /// configured channel ids no strategy could resolve, in configuration order
    pub missing: Vec<String>,
}

impl ResolutionResult {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
