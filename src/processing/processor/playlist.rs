use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use log::{info, warn};
use tokio_util::sync::CancellationToken;

use crate::m3u_curator_error::M3uCuratorError;
use crate::model::{Config, ItemOrigin, PlaylistIndex, ResolutionResult, ResolvedItem, Validity};
use crate::processing::parser::m3u::parse_m3u;
use crate::processing::processor::mapper::{map_channel, map_group_entry};
use crate::processing::processor::resolver::FallbackResolver;
use crate::repository::cache_repository::FileCache;
use crate::utils::network::{get_input_content, StreamValidator};
use crate::utils::step_measure::StepMeasure;
use crate::utils::debug_if_enabled;

/// Single channel state before the fallback pass.
enum ChannelSlot {
    Found(ResolvedItem),
    NotFound,
}

fn select_channels(playlist: &PlaylistIndex, cfg: &Config) -> Vec<ChannelSlot> {
    let default_group = cfg.default_group.as_deref();
    cfg.channels.iter().enumerate().map(|(index, channel)| {
        playlist.get(&channel.id).map_or_else(|| {
            debug_if_enabled!("channel {} not found in playlist", channel.id);
            ChannelSlot::NotFound
        }, |entry| ChannelSlot::Found(map_channel(entry, channel, index, default_group)))
    }).collect()
}

/// Group items ordered after all single channels, by group index then discovery order.
fn select_groups(playlist: &PlaylistIndex, cfg: &Config) -> Vec<ResolvedItem> {
    let mut order = cfg.channels.len();
    let mut items = Vec::new();
    for (group_index, group) in cfg.groups.iter().enumerate() {
        let before = items.len();
        for entry in playlist.values()
            .filter(|entry| entry.group_title == group.id && !group.exclude.contains(&entry.id)) {
            items.push(map_group_entry(entry, group, group_index, order));
            order += 1;
        }
        debug_if_enabled!("group {} selected {} channels", group.id, items.len() - before);
    }
    items
}

/// Checks every item, results are applied in input order.
async fn validate_items<'a, I>(items: I, validator: &dyn StreamValidator, concurrency: usize)
where
    I: Iterator<Item=&'a mut ResolvedItem>,
{
    let items: Vec<&mut ResolvedItem> = items.collect();
    let results: Vec<bool> = stream::iter(items.iter().map(|item| item.url.clone()))
        .map(|url| async move { validator.validate(&url).await })
        .buffered(concurrency.max(1))
        .collect()
        .await;
    for (item, valid) in items.into_iter().zip(results) {
        item.validity = if valid { Validity::Valid } else { Validity::Invalid };
    }
}

/// Resolves the configured channels and groups against a parsed playlist.
///
/// Channels missing from the playlist or failing validation go through the fallback search when
/// stream validation is enabled. Channels whose search is exhausted are reported in `missing`,
/// unless the invalid original is kept because `show_invalid` is set.
pub async fn resolve_playlist(playlist: &PlaylistIndex, cfg: &Config, validator: &dyn StreamValidator) -> ResolutionResult {
    let validation = &cfg.validation;
    let concurrency = validation.concurrency.max(1);

    let mut slots = select_channels(playlist, cfg);
    let mut group_items = select_groups(playlist, cfg);

    if validation.streams {
        let found = slots.iter_mut().filter_map(|slot| match slot {
            ChannelSlot::Found(item) => Some(item),
            ChannelSlot::NotFound => None,
        });
        validate_items(found, validator, concurrency).await;
    }
    if validation.groups {
        validate_items(group_items.iter_mut(), validator, concurrency).await;
    }

    let mut missing = Vec::new();
    let mut pending = Vec::new();
    for (index, slot) in slots.iter().enumerate() {
        match slot {
            ChannelSlot::Found(item) if !item.is_invalid() => {}
            _ if validation.streams => pending.push(index),
            _ => missing.push(index),
        }
    }

    let mut fallbacks: HashMap<usize, Option<ResolvedItem>> = HashMap::new();
    if !pending.is_empty() {
        info!("{} channels missing or broken, searching fallbacks", pending.len());
        let resolver = FallbackResolver::new(playlist, &cfg.channels, validation, cfg.default_group.as_deref(), validator);
        let resolver = &resolver;
        fallbacks = stream::iter(pending)
            .map(|index| async move { (index, resolver.find_fallback(index).await) })
            .buffered(concurrency)
            .collect()
            .await;
    }

    let mut items = Vec::with_capacity(slots.len() + group_items.len());
    for (index, slot) in slots.into_iter().enumerate() {
        match (fallbacks.remove(&index), slot) {
            (Some(Some(substitute)), _) => items.push(substitute),
            (Some(None), ChannelSlot::Found(item)) if validation.show_invalid => items.push(item),
            (Some(None), _) => missing.push(index),
            (None, ChannelSlot::Found(item)) => items.push(item),
            (None, ChannelSlot::NotFound) => {}
        }
    }
    items.extend(group_items.into_iter().filter(|item| validation.show_invalid || !item.is_invalid()));
    items.sort_by_key(|item| item.order);

    missing.sort_unstable();
    let missing = missing.into_iter().map(|index| cfg.channels[index].id.clone()).collect();
    ResolutionResult { items, missing }
}

/// Loads the configured source, parses it and resolves the configured selection.
///
/// Only an unavailable source is an error; everything else ends up in the result.
pub async fn process_playlist(client: &reqwest::Client, cfg: &Config, cache: Option<&FileCache>,
                              validator: &dyn StreamValidator, cancel: &CancellationToken) -> Result<ResolutionResult, M3uCuratorError> {
    let mut step = StepMeasure::new("Source loaded");
    let content = get_input_content(client, &cfg.source, &cfg.working_dir, cache, cfg.cache.lifespan,
                                    Duration::from_secs(cfg.source_timeout_secs), cancel).await?;
    step.tick("Playlist parsed");
    let playlist = parse_m3u(content.lines());
    step.set_items(playlist.len());
    if playlist.is_empty() {
        warn!("playlist source contains no channels");
    }
    step.tick("Channels resolved");
    let result = resolve_playlist(&playlist, cfg, validator).await;
    step.set_items(result.items.len());
    step.stop();
    let (channels, groups) = result.items.iter()
        .fold((0usize, 0usize), |(c, g), item| match item.origin {
            ItemOrigin::Channel(_) => (c + 1, g),
            ItemOrigin::Group(_) => (c, g + 1),
        });
    info!("resolved {} channels and {} group channels, {} missing", channels, groups, result.missing.len());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use tokio_util::sync::CancellationToken;

    use crate::model::{Config, ConfigChannel, ConfigGroup, ConfigValidation, PlaylistEntry, PlaylistIndex, Validity};
    use crate::processing::processor::playlist::{process_playlist, resolve_playlist};
    use crate::processing::processor::test_validator::ScriptedValidator;
    use crate::utils::network::create_client;

    fn entry(id: &str, group: &str) -> PlaylistEntry {
        PlaylistEntry {
            id: id.to_string(),
            group_title: group.to_string(),
            url: format!("http://streams/{id}"),
            ..Default::default()
        }
    }

    fn playlist(entries: &[(&str, &str)]) -> PlaylistIndex {
        entries.iter().map(|(id, group)| (id.to_string(), entry(id, group))).collect()
    }

    fn config(channels: Vec<ConfigChannel>, groups: Vec<ConfigGroup>, validation: ConfigValidation) -> Config {
        Config { source: "playlist.m3u".to_string(), channels, groups, validation, ..Default::default() }
    }

    fn ids(result: &crate::model::ResolutionResult) -> Vec<&str> {
        result.items.iter().map(|item| item.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_selected_channels_without_validation() {
        let playlist = playlist(&[("B", "G"), ("A", "G")]);
        let cfg = config(vec![ConfigChannel::new("A"), ConfigChannel::new("B")], vec![], ConfigValidation::default());
        let validator = ScriptedValidator::new(&[]);
        let result = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(ids(&result), vec!["A", "B"]);
        assert_eq!(result.items.iter().map(|i| i.order).collect::<Vec<_>>(), vec![0, 1]);
        assert!(result.items.iter().all(|i| i.validity == Validity::Unknown));
        assert!(result.missing.is_empty());
        assert_eq!(validator.calls(), 0);
    }

    #[tokio::test]
    async fn test_absent_channel_is_missing_without_validation() {
        let playlist = playlist(&[("A", "G"), ("C HD", "G")]);
        let mut validation = ConfigValidation::default();
        validation.default_fallbacks.insert("C".to_string(), vec!["C HD".to_string()]);
        let cfg = config(vec![ConfigChannel::new("A"), ConfigChannel::new("C")], vec![], validation);
        let validator = ScriptedValidator::new(&["http://streams/C HD"]);
        let result = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(ids(&result), vec!["A"]);
        assert_eq!(result.missing, vec!["C".to_string()]);
        assert_eq!(validator.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_channel_replaced_by_fallback() {
        let playlist = playlist(&[("A", "G"), ("A_HD", "G"), ("B", "G")]);
        let channels = vec![ConfigChannel::new("B"), ConfigChannel {
            group: Some("Custom".to_string()),
            name: Some("Channel A".to_string()),
            fallbacks: vec!["A_HD".to_string()],
            ..ConfigChannel::new("A")
        }];
        let cfg = config(channels, vec![], ConfigValidation { streams: true, ..Default::default() });
        let validator = ScriptedValidator::new(&["http://streams/A_HD", "http://streams/B"]);
        let result = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(ids(&result), vec!["B", "A_HD"]);
        let substitute = &result.items[1];
        assert_eq!(substitute.group_title, "Custom");
        assert_eq!(substitute.display_name(), "Channel A");
        assert_eq!(substitute.order, 1);
        assert_eq!(substitute.validity, Validity::Valid);
        assert!(result.missing.is_empty());
    }

    #[tokio::test]
    async fn test_absent_channel_replaced_by_fallback() {
        let playlist = playlist(&[("A_HD", "Source")]);
        let channels = vec![ConfigChannel {
            group: Some("Custom".to_string()),
            name: Some("Channel A".to_string()),
            epg_id: Some("a.tv".to_string()),
            fallbacks: vec!["A_HD".to_string()],
            ..ConfigChannel::new("A")
        }];
        let cfg = config(channels, vec![], ConfigValidation { streams: true, ..Default::default() });
        let validator = ScriptedValidator::new(&["http://streams/A_HD"]);
        let result = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(ids(&result), vec!["A_HD"]);
        let substitute = &result.items[0];
        assert_eq!(substitute.order, 0);
        assert_eq!(substitute.group_title, "Custom");
        assert_eq!(substitute.display_name(), "Channel A");
        assert_eq!(substitute.epg_id, "a.tv");
        assert_eq!(substitute.validity, Validity::Valid);
        assert!(result.missing.is_empty());
        assert_eq!(validator.calls(), 1);
    }

    #[tokio::test]
    async fn test_group_exclusion_and_order() {
        let playlist = playlist(&[("X", "sports"), ("N", "news"), ("Y", "sports"), ("Z", "sports"), ("A", "news")]);
        let groups = vec![
            ConfigGroup { id: "sports".to_string(), exclude: HashSet::from(["X".to_string()]), ..Default::default() },
            ConfigGroup { id: "news".to_string(), name: Some("News".to_string()), ..Default::default() },
        ];
        let cfg = config(vec![ConfigChannel::new("A")], groups, ConfigValidation::default());
        let validator = ScriptedValidator::new(&[]);
        let result = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(ids(&result), vec!["A", "Y", "Z", "N", "A"]);
        let orders: Vec<usize> = result.items.iter().map(|i| i.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3, 4]);
        assert_eq!(result.items[3].group_title, "News");
    }

    #[tokio::test]
    async fn test_show_invalid_keeps_flagged_items() {
        let playlist = playlist(&[("A", "G"), ("B", "G"), ("M", "misc")]);
        let groups = vec![ConfigGroup { id: "misc".to_string(), ..Default::default() }];
        let channels = vec![ConfigChannel::new("A"), ConfigChannel::new("B")];

        let validation = ConfigValidation { streams: true, groups: true, ..Default::default() };
        let cfg = config(channels.clone(), groups.clone(), validation);
        let result = resolve_playlist(&playlist, &cfg, &ScriptedValidator::new(&["http://streams/B"])).await;
        assert_eq!(ids(&result), vec!["B"]);
        assert_eq!(result.missing, vec!["A".to_string()]);

        let validation = ConfigValidation { streams: true, groups: true, show_invalid: true, ..Default::default() };
        let cfg = config(channels, groups, validation);
        let result = resolve_playlist(&playlist, &cfg, &ScriptedValidator::new(&["http://streams/B"])).await;
        assert_eq!(ids(&result), vec!["A", "B", "M"]);
        assert!(result.items[0].is_invalid());
        assert!(result.items[2].is_invalid());
        assert!(result.missing.is_empty());
    }

    #[tokio::test]
    async fn test_missing_follows_configuration_order() {
        let playlist = playlist(&[("B", "G")]);
        let channels = vec![ConfigChannel::new("C"), ConfigChannel::new("B"), ConfigChannel::new("A")];
        let cfg = config(channels, vec![], ConfigValidation { streams: true, concurrency: 3, ..Default::default() });
        let result = resolve_playlist(&playlist, &cfg, &ScriptedValidator::new(&[])).await;
        assert!(result.items.is_empty());
        assert_eq!(result.missing, vec!["C".to_string(), "B".to_string(), "A".to_string()]);
    }

    #[tokio::test]
    async fn test_resolution_is_deterministic() {
        let playlist = playlist(&[("A", "G"), ("B", "G"), ("C", "G"), ("D", "H")]);
        let groups = vec![ConfigGroup { id: "G".to_string(), ..Default::default() }];
        let cfg = config(vec![ConfigChannel::new("D"), ConfigChannel::new("B")], groups, ConfigValidation::default());
        let validator = ScriptedValidator::new(&[]);
        let first = resolve_playlist(&playlist, &cfg, &validator).await;
        let second = resolve_playlist(&playlist, &cfg, &validator).await;
        assert_eq!(first, second);
        assert!(first.items[2..].iter().all(|item| item.order >= cfg.channels.len()));
    }

    #[tokio::test]
    async fn test_process_local_playlist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("playlist.m3u"), "#EXTM3U\n#EXTINF:-1 tvg-name=\"A\" group-title=\"G\",A\nhttp://streams/A\n").unwrap();
        let mut cfg = config(vec![ConfigChannel::new("A")], vec![], ConfigValidation::default());
        cfg.working_dir = dir.path().to_string_lossy().to_string();
        let client = create_client(std::time::Duration::from_secs(5)).unwrap();
        let result = process_playlist(&client, &cfg, None, &ScriptedValidator::new(&[]), &CancellationToken::new()).await.unwrap();
        assert_eq!(ids(&result), vec!["A"]);

        cfg.source = "absent.m3u".to_string();
        assert!(process_playlist(&client, &cfg, None, &ScriptedValidator::new(&[]), &CancellationToken::new()).await.is_err());
    }
}
