use std::sync::LazyLock;

use indexmap::map::Entry;
use log::debug;
use regex::Regex;

use crate::model::{PlaylistEntry, PlaylistIndex};
use crate::utils::trace_if_enabled;

const EXTM3U_HEADER: &str = "#EXTM3U";
const EXTINF_MARKER: &str = "#EXTINF:";

macro_rules! attribute_regex {
    ($name:literal) => {
        LazyLock::new(|| Regex::new(concat!($name, r#"="([^"]*)""#)).unwrap())
    };
}

static TVG_NAME_REGEX: LazyLock<Regex> = attribute_regex!("tvg-name");
static TVG_ID_REGEX: LazyLock<Regex> = attribute_regex!("tvg-id");
static TVG_LOGO_REGEX: LazyLock<Regex> = attribute_regex!("tvg-logo");
static GROUP_TITLE_REGEX: LazyLock<Regex> = attribute_regex!("group-title");

/// First match of `key="value"`, case-sensitive, empty if the attribute is missing.
fn attribute_value(line: &str, regex: &Regex) -> String {
    regex.captures(line)
        .and_then(|caps| caps.get(1))
        .map_or_else(String::new, |m| m.as_str().to_string())
}

/// Display title: the text after the first comma outside of quoted attribute values.
fn extract_title(line: &str) -> &str {
    let mut in_quotes = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return line[pos + 1..].trim(),
            _ => {}
        }
    }
    ""
}

fn process_header(header: &str, url: &str) -> PlaylistEntry {
    let mut id = attribute_value(header, &TVG_NAME_REGEX);
    if id.is_empty() {
        id = extract_title(header).to_string();
    }
    PlaylistEntry {
        id,
        group_title: attribute_value(header, &GROUP_TITLE_REGEX),
        epg_id: attribute_value(header, &TVG_ID_REGEX),
        logo: attribute_value(header, &TVG_LOGO_REGEX),
        url: url.trim().to_string(),
    }
}

/// Visits every entry of the playlist in source order.
///
/// The content is read as `#EXTINF` / url line pairs. A pair whose first line is not an
/// `#EXTINF` line is skipped as a whole, so a broken line never shifts the following pairs.
/// Blank lines and a leading `#EXTM3U` header are ignored.
pub fn consume_m3u<'a, I, F: FnMut(PlaylistEntry)>(lines: I, mut visit: F)
where
    I: Iterator<Item=&'a str>,
{
    let mut lines = lines
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
        .peekable();
    if lines.peek().is_some_and(|line| line.starts_with(EXTM3U_HEADER)) {
        lines.next();
    }
    while let Some(header) = lines.next() {
        let url = lines.next();
        if !header.starts_with(EXTINF_MARKER) {
            trace_if_enabled!("skipping line pair starting with {}", header);
            continue;
        }
        match url {
            Some(url_line) => visit(process_header(header, url_line)),
            None => trace_if_enabled!("skipping entry without url {}", header),
        }
    }
}

/// Parses the playlist into an index keyed by entry id, the first occurrence of an id wins.
pub fn parse_m3u<'a, I>(lines: I) -> PlaylistIndex
where
    I: Iterator<Item=&'a str>,
{
    let mut index = PlaylistIndex::new();
    let mut duplicates = 0usize;
    consume_m3u(lines, |entry| {
        if entry.id.is_empty() {
            return;
        }
        match index.entry(entry.id.clone()) {
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
            }
            Entry::Occupied(_) => duplicates += 1,
        }
    });
    debug!("parsed {} playlist entries, ignored {} duplicates", index.len(), duplicates);
    index
}
