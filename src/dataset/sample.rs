//! Time-boxed cache of a random subset of rows.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::seq::index;
use rand_pcg::Pcg64;
use serde::Serialize;
use tracing::debug;

use crate::types::{Table, Value};

/// Random rows drawn without replacement, in table order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    /// Positions of `rows` in the table at draw time, ascending.
    pub row_indices: Vec<usize>,
    pub generated_at: DateTime<Utc>,
    /// `true` when served from the cache instead of freshly drawn.
    pub cached: bool,
}

#[derive(Debug)]
struct Entry {
    requested: usize,
    drawn_at: Instant,
    sample: Sample,
}

/// Holds at most one sample. Callers clear it whenever the table changes.
#[derive(Debug)]
pub(crate) struct SampleCache {
    entry: Option<Entry>,
    ttl: Duration,
}

impl SampleCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { entry: None, ttl }
    }

    pub(crate) fn clear(&mut self) {
        self.entry = None;
    }

    /// Up to `n` random rows of `table`.
    ///
    /// The cached sample is reused when it was drawn for the same `n`, is no older than the TTL
    /// and `force_refresh` is not set.
    pub(crate) fn get(&mut self, table: &Table, n: usize, force_refresh: bool, rng: &mut Pcg64) -> Sample {
        if !force_refresh {
            if let Some(entry) = &self.entry {
                if entry.requested == n && entry.drawn_at.elapsed() <= self.ttl {
                    let mut sample = entry.sample.clone();
                    sample.cached = true;
                    return sample;
                }
            }
        }

        let amount = n.min(table.row_count());
        let mut row_indices = index::sample(rng, table.row_count(), amount).into_vec();
        row_indices.sort_unstable();
        let sample = Sample {
            columns: table.column_names(),
            rows: row_indices.iter().map(|&i| table.row(i)).collect(),
            row_indices,
            generated_at: Utc::now(),
            cached: false,
        };
        debug!(requested = n, drawn = amount, "sample refreshed");

        self.entry = Some(Entry {
            requested: n,
            drawn_at: Instant::now(),
            sample: sample.clone(),
        });
        sample
    }
}
