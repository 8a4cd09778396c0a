use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::LazyLock;
use std::time::{Duration, Instant};

use log::{debug, error};
use regex::Regex;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::m3u_curator_error::{str_to_io_error, M3uCuratorError};
use crate::notify_err;
use crate::repository::cache_repository::FileCache;
use crate::utils::compression::compression_utils::{decompress_bytes, is_gzip, GZIP_EXTENSION};
use crate::utils::debug_if_enabled;
use crate::utils::file::file_utils::get_file_path;

const USER_AGENT: &str = concat!("m3u-curator/", env!("CARGO_PKG_VERSION"));

pub fn create_client(timeout: Duration) -> Result<reqwest::Client, M3uCuratorError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout)
        .pool_max_idle_per_host(16)
        .build()
        .map_err(|err| notify_err!("cant create http client: {}", err))
}

fn is_remote_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Loads the playlist text for `source`.
///
/// Remote sources are served from `cache` when a fresh entry exists and stored there
/// after a successful download. A download is bounded by `timeout` and aborted when
/// `cancel` fires. Local files are read relative to `working_dir`.
/// Gzip content is decompressed transparently.
pub async fn get_input_content(client: &reqwest::Client, source: &str, working_dir: &str,
                               cache: Option<&FileCache>, lifespan_hours: u64,
                               timeout: Duration, cancel: &CancellationToken) -> Result<String, M3uCuratorError> {
    debug_if_enabled!("getting input content working_dir: {}, source: {}", working_dir, sanitize_sensitive_info(source));
    let content = match source.parse::<Url>() {
        Ok(url) if is_remote_url(&url) => {
            if let Some(cached) = cache.and_then(|c| c.get(source, lifespan_hours)) {
                cached
            } else {
                let download_result = tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        return Err(notify_err!("download cancelled {}", sanitize_sensitive_info(source)));
                    }
                    result = tokio::time::timeout(timeout, get_remote_content(client, &url)) => {
                        result.unwrap_or_else(|_| Err(str_to_io_error(&format!("no response within {}s", timeout.as_secs()))))
                    }
                };
                let downloaded = download_result.map_err(|err| {
                    error!("cant download input url: {}  => {}", sanitize_sensitive_info(source), sanitize_sensitive_info(err.to_string().as_str()));
                    notify_err!("cant download playlist source {}", sanitize_sensitive_info(source))
                })?;
                if let Some(c) = cache {
                    c.set(source, &downloaded);
                }
                downloaded
            }
        }
        Ok(url) if url.scheme() == "file" => {
            let file_path = url.to_file_path().map_err(|()| notify_err!("unknown file {}", source))?;
            get_local_file_content(&file_path)?
        }
        _ => {
            let file_path = get_file_path(working_dir, Some(PathBuf::from(source))).unwrap_or_else(|| PathBuf::from(source));
            get_local_file_content(&file_path)?
        }
    };
    decode_content(source, content)
}

fn get_local_file_content(file_path: &PathBuf) -> Result<Vec<u8>, M3uCuratorError> {
    if file_path.is_file() {
        std::fs::read(file_path).map_err(|err| notify_err!("cant read file {}: {}", file_path.display(), err))
    } else {
        Err(notify_err!("cant find file {}", file_path.display()))
    }
}

fn decode_content(source: &str, content: Vec<u8>) -> Result<String, M3uCuratorError> {
    let gz_extension = source.rsplit('.').next().is_some_and(|ext| ext.eq_ignore_ascii_case(GZIP_EXTENSION));
    let bytes = if is_gzip(&content) || gz_extension {
        debug!("decompressing {}", sanitize_sensitive_info(source));
        decompress_bytes(&content).map_err(|err| notify_err!("failed to decode gzip content of {}: {}", sanitize_sensitive_info(source), err))?
    } else {
        content
    };
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

async fn get_remote_content(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, std::io::Error> {
    let start_time = Instant::now();
    match client.get(url.clone()).send().await {
        Ok(response) => {
            if response.status().is_success() {
                match response.bytes().await {
                    Ok(bytes) => {
                        debug_if_enabled!("Request took:{} ms {}", start_time.elapsed().as_millis(), sanitize_sensitive_info(url.as_str()));
                        Ok(bytes.to_vec())
                    }
                    Err(err) => Err(str_to_io_error(&format!("failed to read response {} {err}", sanitize_sensitive_info(url.as_str()))))
                }
            } else {
                Err(str_to_io_error(&format!("Request failed with status {} {}", response.status(), sanitize_sensitive_info(url.as_str()))))
            }
        }
        Err(err) => Err(str_to_io_error(&format!("Request failed {} {err}", sanitize_sensitive_info(url.as_str()))))
    }
}

static USERNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(username=)[^&]*").unwrap());
static PASSWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(password=)[^&]*").unwrap());
static TOKEN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(token=)[^&]*").unwrap());
static USERINFO_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(://)[^/@]+@").unwrap());

static SANITIZE_SENSITIVE_INFO: LazyLock<AtomicBool> = LazyLock::new(|| AtomicBool::new(true));

pub fn set_sanitize_sensitive_info(value: bool) {
    SANITIZE_SENSITIVE_INFO.store(value, Ordering::Relaxed);
}

/// Masks credentials in urls before they reach the log.
pub fn sanitize_sensitive_info(query: &str) -> String {
    if SANITIZE_SENSITIVE_INFO.load(Ordering::Relaxed) {
        let masked_query = USERNAME_REGEX.replace_all(query, "$1***");
        let masked_query = PASSWORD_REGEX.replace_all(&masked_query, "$1***");
        let masked_query = TOKEN_REGEX.replace_all(&masked_query, "$1***");
        let masked_query = USERINFO_REGEX.replace_all(&masked_query, "$1***@");
        masked_query.to_string()
    } else {
        query.to_string()
    }
}
