use std::time::Duration;
use std::time::Instant;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct QueryTiming {
    pub k: String,
    // seconds
    pub t: f64,
}

/// Wall-clock time of named query sections. Nested sections are keyed by
/// their full path, e.g. `funnel/context`.
#[derive(Clone, Debug, Default)]
pub struct Timings {
    stack: Vec<String>,
    timings: IndexMap<String, Duration>,
}

impl Timings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn measure<T, F>(&mut self, key: &str, f: F) -> T
    where F: FnOnce(&mut Timings) -> T {
        self.stack.push(key.to_string());
        let path = self.stack.join("/");
        let start = Instant::now();
        let res = f(self);
        let elapsed = start.elapsed();
        self.stack.pop();

        debug!("{path} elapsed: {:?}", elapsed);
        *self.timings.entry(path).or_default() += elapsed;

        res
    }

    pub fn get(&self, path: &str) -> Option<Duration> {
        self.timings.get(path).copied()
    }

    /// Sections in the order they finished.
    pub fn to_list(&self) -> Vec<QueryTiming> {
        self.timings
            .iter()
            .map(|(k, t)| QueryTiming {
                k: k.to_owned(),
                t: t.as_secs_f64(),
            })
            .collect()
    }
}
