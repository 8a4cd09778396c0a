use std::fmt::Write;
use std::path::{Path, PathBuf};

const FILE_SUFFIX_CACHE: &str = "cache";

pub(crate) fn hash_string(value: &str) -> [u8; 32] {
    let hash = blake3::hash(value.as_bytes());
    hash.into() // convert to hash array
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().fold(String::new(), |mut output, b| {
        let _ = write!(output, "{b:02X}");
        output
    })
}

pub(crate) fn hash_string_as_hex(value: &str) -> String {
    hex_encode(&hash_string(value))
}

/// File holding the cached bytes of the given source identifier.
pub(crate) fn get_cache_file_path(cache_root: &Path, source: &str) -> PathBuf {
    cache_root.join(format!("{}.{FILE_SUFFIX_CACHE}", hash_string_as_hex(source)))
}
