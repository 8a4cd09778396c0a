use std::fmt::Write;
use std::path::Path;

use log::info;

use crate::create_m3u_curator_error_result;
use crate::m3u_curator_error::{M3uCuratorError, M3uCuratorErrorKind};
use crate::model::ResolvedItem;
use crate::utils::compression_utils::compress_file;
use crate::utils::file_utils::write_atomically;

const M3U_HEADER: &str = "#EXTM3U";

macro_rules! cant_write_result {
    ($path:expr, $err:expr) => {
        create_m3u_curator_error_result!(M3uCuratorErrorKind::Notify, "failed to write m3u playlist: {} - {}", $path.display(), $err)
    }
}

fn write_item(output: &mut String, item: &ResolvedItem) {
    let _ = writeln!(output, "#EXTINF:-1 tvg-id=\"{}\" tvg-name=\"{}\" tvg-logo=\"{}\" group-title=\"{}\",{}",
                     item.epg_id, item.id, item.logo, item.group_title, item.display_name());
    let _ = writeln!(output, "{}", item.url);
}

/// Renders the items in `order` sequence.
pub fn render_m3u_playlist(items: &[ResolvedItem]) -> String {
    let mut sorted: Vec<&ResolvedItem> = items.iter().collect();
    sorted.sort_by_key(|item| item.order);
    let mut output = String::with_capacity(256 * (sorted.len() + 1));
    output.push_str(M3U_HEADER);
    output.push('\n');
    for item in sorted {
        write_item(&mut output, item);
    }
    output
}

pub fn write_m3u_playlist(path: &Path, items: &[ResolvedItem], compress: bool) -> Result<(), M3uCuratorError> {
    info!("Writing m3u playlist with {} channels to {}", items.len(), path.display());
    let content = render_m3u_playlist(items);
    if let Err(err) = write_atomically(path, content.as_bytes()) {
        return cant_write_result!(path, err);
    }
    if compress {
        match compress_file(path) {
            Ok(gz_path) => info!("Saved compressed playlist to {}", gz_path.display()),
            Err(err) => return cant_write_result!(path, err),
        }
    }
    Ok(())
}
