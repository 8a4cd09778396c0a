use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use log::debug;

use crate::utils::file::file_utils::file_writer;

pub const GZIP_EXTENSION: &str = "gz";

pub const fn is_gzip(bytes: &[u8]) -> bool {
    // Gzip files start with the bytes 0x1F 0x8B
    bytes.len() >= 2 && bytes[0] == 0x1F && bytes[1] == 0x8B
}

pub fn decompress_bytes(input: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(input);
    let mut decompressed = Vec::with_capacity(input.len() * 4);
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// Writes a gzip copy of `path` next to it (`<path>.gz`) and returns the new path.
pub fn compress_file(path: &Path) -> std::io::Result<PathBuf> {
    let file_name = path.file_name().map_or_else(String::new, |name| name.to_string_lossy().to_string());
    let target = path.with_file_name(format!("{file_name}.{GZIP_EXTENSION}"));
    let mut reader = BufReader::new(File::open(path)?);
    let mut encoder = GzEncoder::new(file_writer(File::create(&target)?), Compression::default());
    std::io::copy(&mut reader, &mut encoder)?;
    let mut writer = encoder.finish()?;
    std::io::Write::flush(&mut writer)?;
    debug!("compressed {} to {}", path.display(), target.display());
    Ok(target)
}
