use std::time::Duration;

use futures::future::BoxFuture;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use tokio_util::sync::CancellationToken;

use crate::model::{ConfigValidation, MAX_CONTENT_LENGTH_BYTES};
use crate::utils::network::request::sanitize_sensitive_info;
use crate::utils::trace_if_enabled;

/// Liveness check for a stream url.
///
/// Implementations never fail: every error, timeout or cancellation counts as `false`.
pub trait StreamValidator: Send + Sync {
    fn validate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, bool>;
}

/// Checks streams with a partial HTTP GET.
pub struct HttpStreamValidator {
    client: reqwest::Client,
    content_types: Vec<String>,
    min_content_length: u64,
    timeout: Duration,
    cancel: CancellationToken,
}

impl HttpStreamValidator {
    pub fn new(client: reqwest::Client, validation: &ConfigValidation, cancel: CancellationToken) -> Self {
        Self {
            client,
            content_types: validation.content_types.clone(),
            min_content_length: validation.min_content_length,
            timeout: Duration::from_secs(validation.timeout_secs),
            cancel,
        }
    }
}

impl StreamValidator for HttpStreamValidator {
    fn validate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let valid = tokio::select! {
                biased;
                () = self.cancel.cancelled() => false,
                result = tokio::time::timeout(self.timeout, check_stream(&self.client, url, &self.content_types, self.min_content_length)) => {
                    result.unwrap_or_else(|_| {
                        trace_if_enabled!("stream check timed out {}", sanitize_sensitive_info(url));
                        false
                    })
                }
            };
            trace_if_enabled!("stream check {} => {}", sanitize_sensitive_info(url), valid);
            valid
        })
    }
}

fn is_allowed_content_type(headers: &HeaderMap, content_types: &[String]) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let essence = value.parse::<mime::Mime>()
        .map_or_else(|_| value.split(';').next().unwrap_or_default().trim().to_string(),
                     |mime_type| mime_type.essence_str().to_string());
    content_types.iter().any(|allowed| allowed.eq_ignore_ascii_case(&essence))
}

/// Fetches `url` and reads at most `min_content_length` bytes of the body.
///
/// Valid means: success status, an allowed content type (any if `content_types` is empty)
/// and at least `min_content_length` body bytes before the stream ends. The threshold
/// is capped at `MAX_CONTENT_LENGTH_BYTES`.
pub async fn check_stream(client: &reqwest::Client, url: &str, content_types: &[String], min_content_length: u64) -> bool {
    let min_content_length = min_content_length.min(MAX_CONTENT_LENGTH_BYTES);
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(err) => {
            trace_if_enabled!("stream request failed {} {}", sanitize_sensitive_info(url), err);
            return false;
        }
    };
    if !response.status().is_success() {
        trace_if_enabled!("stream check failed with status {} {}", response.status(), sanitize_sensitive_info(url));
        return false;
    }
    if !content_types.is_empty() && !is_allowed_content_type(response.headers(), content_types) {
        trace_if_enabled!("stream content type not allowed {}", sanitize_sensitive_info(url));
        return false;
    }
    if min_content_length == 0 {
        return true;
    }

    let mut received: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(bytes) => {
                received += bytes.len() as u64;
                if received >= min_content_length {
                    return true;
                }
            }
            Err(_) => return false,
        }
    }
    false
}
