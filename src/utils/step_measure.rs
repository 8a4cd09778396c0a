use log::{debug, log_enabled, Level};
use std::time::{Duration, Instant};

fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    let secs = duration.as_secs();
    let mins = secs / 60;
    let secs_rem = secs % 60;
    let millis_rem = duration.subsec_millis();

    if millis < 1_000 {
        format!("{millis} ms")
    } else if secs < 60 {
        format!("{secs}.{millis_rem:03} s")
    } else {
        format!("{mins}:{secs_rem:02}.{millis_rem:03} min")
    }
}

/// Logs the duration of consecutive pipeline stages at debug level,
/// optionally with the number of items a stage produced.
pub struct StepMeasure {
    enabled: bool,
    stage: String,
    items: Option<usize>,
    start: Instant,
}

impl StepMeasure {
    pub fn new(stage: &str) -> Self {
        Self {
            enabled: log_enabled!(Level::Debug),
            stage: stage.to_string(),
            items: None,
            start: Instant::now(),
        }
    }

    pub fn set_items(&mut self, count: usize) {
        self.items = Some(count);
    }

    /// Finishes the current stage and starts the next one.
    pub fn tick(&mut self, next_stage: &str) {
        if self.enabled {
            self.log_stage();
            self.stage = next_stage.to_string();
            self.items = None;
            self.start = Instant::now();
        }
    }

    pub fn stop(&mut self) {
        if self.enabled && !self.stage.is_empty() {
            self.log_stage();
            self.enabled = false;
        }
    }

    fn log_stage(&self) {
        let elapsed = format_duration(self.start.elapsed());
        match self.items {
            Some(count) => debug!("{} finished with {count} items in {elapsed}", self.stage),
            None => debug!("{} finished in {elapsed}", self.stage),
        }
    }
}

impl Drop for StepMeasure {
    fn drop(&mut self) {
        self.stop();
    }
}
