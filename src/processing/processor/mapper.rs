use crate::model::{ConfigChannel, ConfigGroup, ItemOrigin, PlaylistEntry, ResolvedItem, Validity};

/// Maps a playlist entry onto a configured single channel.
///
/// Overrides from `channel` win over the entry's values. The group is taken from the channel,
/// then from `default_group`, then from the entry. `order` is the channel's configuration index.
pub fn map_channel(entry: &PlaylistEntry, channel: &ConfigChannel, order: usize, default_group: Option<&str>) -> ResolvedItem {
    let logo = channel.logo.as_ref().map_or_else(|| entry.logo.clone(), Clone::clone);
    let has_custom_logo = logo != entry.logo;
    let group_title = channel.group.as_deref()
        .or(default_group)
        .map_or_else(|| entry.group_title.clone(), ToString::to_string);
    ResolvedItem {
        id: entry.id.clone(),
        group_title,
        friendly_name: channel.name.clone(),
        epg_id: channel.epg_id.as_ref().map_or_else(|| entry.epg_id.clone(), Clone::clone),
        logo,
        has_custom_logo,
        url: entry.url.clone(),
        order,
        validity: Validity::Unknown,
        origin: ItemOrigin::Channel(order),
    }
}

/// Maps a member of a configured group. Only the group title is overridden.
pub fn map_group_entry(entry: &PlaylistEntry, group: &ConfigGroup, group_index: usize, order: usize) -> ResolvedItem {
    ResolvedItem {
        id: entry.id.clone(),
        group_title: group.title().to_string(),
        friendly_name: None,
        epg_id: entry.epg_id.clone(),
        logo: entry.logo.clone(),
        has_custom_logo: false,
        url: entry.url.clone(),
        order,
        validity: Validity::Unknown,
        origin: ItemOrigin::Group(group_index),
    }
}
