use std::collections::HashSet;

use log::{debug, info, warn};

use crate::model::{ConfigChannel, ConfigValidation, PlaylistEntry, PlaylistIndex, ResolvedItem, Validity};
use crate::processing::processor::mapper::map_channel;
use crate::utils::network::{sanitize_sensitive_info, StreamValidator};
use crate::utils::debug_if_enabled;

/// Searches live substitutes for configured single channels.
pub struct FallbackResolver<'a> {
    playlist: &'a PlaylistIndex,
    channels: &'a [ConfigChannel],
    validation: &'a ConfigValidation,
    default_group: Option<&'a str>,
    validator: &'a dyn StreamValidator,
}

impl<'a> FallbackResolver<'a> {
    pub fn new(playlist: &'a PlaylistIndex, channels: &'a [ConfigChannel], validation: &'a ConfigValidation,
               default_group: Option<&'a str>, validator: &'a dyn StreamValidator) -> Self {
        Self {
            playlist,
            channels,
            validation,
            default_group,
            validator,
        }
    }

    /// Candidate ids for `channel` in search order: the explicit fallbacks first, then the
    /// substitutions of the first default pattern contained in the channel id.
    pub fn candidates(&self, channel: &ConfigChannel) -> Vec<String> {
        let mut seen = HashSet::new();
        seen.insert(channel.id.as_str().to_string());
        channel.fallbacks.iter().cloned()
            .chain(pattern_candidates(&channel.id, self.validation))
            .filter(|candidate| seen.insert(candidate.clone()))
            .collect()
    }

    /// Returns the first candidate of the channel at `channel_index` that exists and validates,
    /// mapped with the channel's overrides and order. Candidates are tried one after another.
    pub async fn find_fallback(&self, channel_index: usize) -> Option<ResolvedItem> {
        let channel = self.channels.get(channel_index)?;
        for candidate in self.candidates(channel) {
            let Some(entry) = self.playlist.get(&candidate) else {
                debug_if_enabled!("fallback {} for {} not in playlist", candidate, channel.id);
                continue;
            };
            if self.is_live(entry).await {
                info!("fallback found for {}, now using {}", channel.id, entry.id);
                let mut item = map_channel(entry, channel, channel_index, self.default_group);
                item.validity = Validity::Valid;
                return Some(item);
            }
        }
        warn!("no fallback found for {}", channel.id);
        None
    }

    async fn is_live(&self, entry: &PlaylistEntry) -> bool {
        let valid = self.validator.validate(&entry.url).await;
        if !valid {
            debug!("fallback {} failed validation {}", entry.id, sanitize_sensitive_info(&entry.url));
        }
        valid
    }
}

/// Substitutions of the first pattern whose key is a substring of `id`, in declaration order.
fn pattern_candidates(id: &str, validation: &ConfigValidation) -> Vec<String> {
    validation.default_fallbacks.iter()
        .find(|(pattern, _)| id.contains(pattern.as_str()))
        .map(|(pattern, substitutes)| {
            substitutes.iter()
                .map(|substitute| id.replace(pattern.as_str(), substitute))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::model::{ConfigChannel, ConfigValidation, ItemOrigin, PlaylistEntry, PlaylistIndex, Validity};
    use crate::processing::processor::resolver::{pattern_candidates, FallbackResolver};
    use crate::processing::processor::test_validator::ScriptedValidator;

    fn playlist(ids: &[&str]) -> PlaylistIndex {
        ids.iter().map(|id| (id.to_string(), PlaylistEntry {
            id: id.to_string(),
            group_title: "Source".to_string(),
            url: format!("http://streams/{id}"),
            ..Default::default()
        })).collect()
    }

    fn validation(patterns: &[(&str, &[&str])]) -> ConfigValidation {
        let mut default_fallbacks = IndexMap::new();
        for (pattern, substitutes) in patterns {
            default_fallbacks.insert(pattern.to_string(), substitutes.iter().map(ToString::to_string).collect());
        }
        ConfigValidation { streams: true, default_fallbacks, ..Default::default() }
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let validation = validation(&[(" HD", &[" SD", " FHD"]), ("Sport HD", &[" Sport"])]);
        assert_eq!(pattern_candidates("Sport HD", &validation), vec!["Sport SD".to_string(), "Sport FHD".to_string()]);
        assert!(pattern_candidates("Sport", &validation).is_empty());
    }

    #[tokio::test]
    async fn test_explicit_fallback_has_priority() {
        let playlist = playlist(&["A", "A_HD", "A SD"]);
        let validation = validation(&[("A", &["A SD"])]);
        let channels = vec![ConfigChannel {
            group: Some("Custom".to_string()),
            fallbacks: vec!["A_HD".to_string()],
            ..ConfigChannel::new("A")
        }];
        let validator = ScriptedValidator::new(&["http://streams/A_HD", "http://streams/A SD"]);
        let resolver = FallbackResolver::new(&playlist, &channels, &validation, None, &validator);

        let item = resolver.find_fallback(0).await.unwrap();
        assert_eq!(item.id, "A_HD");
        assert_eq!(item.group_title, "Custom");
        assert_eq!(item.validity, Validity::Valid);
        assert_eq!(item.origin, ItemOrigin::Channel(0));
        assert_eq!(validator.calls(), 1);
    }

    #[tokio::test]
    async fn test_pattern_fallback_after_explicit_failures() {
        let playlist = playlist(&["News HD", "News Backup", "News SD", "News FHD"]);
        let validation = validation(&[(" HD", &[" SD", " FHD"])]);
        let channels = vec![ConfigChannel::new("Other"), ConfigChannel {
            fallbacks: vec!["News Missing".to_string(), "News Backup".to_string()],
            ..ConfigChannel::new("News HD")
        }];
        let validator = ScriptedValidator::new(&["http://streams/News FHD"]);
        let resolver = FallbackResolver::new(&playlist, &channels, &validation, None, &validator);

        let item = resolver.find_fallback(1).await.unwrap();
        assert_eq!(item.id, "News FHD");
        assert_eq!(item.order, 1);
        assert_eq!(validator.checked(), vec![
            "http://streams/News Backup".to_string(),
            "http://streams/News SD".to_string(),
            "http://streams/News FHD".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_exhausted_search() {
        let playlist = playlist(&["A", "B"]);
        let validation = validation(&[]);
        let channels = vec![ConfigChannel { fallbacks: vec!["B".to_string(), "A".to_string()], ..ConfigChannel::new("A") }];
        let validator = ScriptedValidator::new(&[]);
        let resolver = FallbackResolver::new(&playlist, &channels, &validation, None, &validator);

        assert!(resolver.find_fallback(0).await.is_none());
        assert_eq!(validator.checked(), vec!["http://streams/B".to_string()]);
        assert!(resolver.find_fallback(5).await.is_none());
    }
}
