use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use futures::future::BoxFuture;

use crate::utils::network::StreamValidator;

/// Validator answering from a fixed set of live urls, recording every checked url.
pub(crate) struct ScriptedValidator {
    live: HashSet<String>,
    count: AtomicUsize,
    checked: Mutex<Vec<String>>,
}

impl ScriptedValidator {
    pub(crate) fn new(live: &[&str]) -> Self {
        Self {
            live: live.iter().map(ToString::to_string).collect(),
            count: AtomicUsize::new(0),
            checked: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) fn checked(&self) -> Vec<String> {
        self.checked.lock().unwrap().clone()
    }
}

impl StreamValidator for ScriptedValidator {
    fn validate<'a>(&'a self, url: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.checked.lock().unwrap().push(url.to_string());
            self.live.contains(url)
        })
    }
}
