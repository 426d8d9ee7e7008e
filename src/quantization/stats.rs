use rayon::prelude::*;
use tracing::{trace, warn};

use super::Sample;
use crate::error::{QuantizationError, Result};

/// Running minimum and maximum of the samples observed so far.
///
/// Stats from disjoint shards combine with [`CalibrationStats::merge`], which is
/// commutative and associative, so sharded calibration gives the same bounds
/// as a single pass over all samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CalibrationStats {
    min_value: f64,
    max_value: f64,
    initialized: bool,
}

impl CalibrationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_samples<T: Sample>(samples: &[T]) -> Self {
        let mut stats = Self::new();
        stats.observe(samples);
        stats
    }

    /// Calibrates `shard_len`-sized chunks in parallel and merges the results.
    pub fn from_shards<T: Sample>(samples: &[T], shard_len: usize) -> Self {
        let shard_len = shard_len.max(1);
        samples
            .par_chunks(shard_len)
            .enumerate()
            .map(|(shard, chunk)| {
                let stats = Self::from_samples(chunk);
                trace!(shard, len = chunk.len(), ?stats, "calibrated shard");
                stats
            })
            .reduce(Self::new, |a, b| a.merge(&b))
    }

    pub(crate) fn from_bounds(min_value: f64, max_value: f64) -> Self {
        Self {
            min_value,
            max_value,
            initialized: true,
        }
    }

    /// Folds `samples` into the current bounds. NaN and infinite samples are
    /// skipped; an empty (or entirely non-finite) slice leaves `self` untouched.
    pub fn observe<T: Sample>(&mut self, samples: &[T]) {
        let mut dropped = 0usize;

        for x in samples.iter().map(|s| s.to_f64()) {
            if !x.is_finite() {
                dropped += 1;
                continue;
            }
            // normalize -0.0 so merge order cannot pick a different zero
            let x = if x == 0.0 { 0.0 } else { x };

            if self.initialized {
                self.min_value = self.min_value.min(x);
                self.max_value = self.max_value.max(x);
            } else {
                self.min_value = x;
                self.max_value = x;
                self.initialized = true;
            }
        }

        if dropped > 0 {
            warn!(dropped, total = samples.len(), "skipped non-finite calibration samples");
        }
    }

    pub fn merge(&self, other: &Self) -> Self {
        match (self.initialized, other.initialized) {
            (false, _) => *other,
            (_, false) => *self,
            (true, true) => Self::from_bounds(
                self.min_value.min(other.min_value),
                self.max_value.max(other.max_value),
            ),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// `(min, max)`, or [`QuantizationError::EmptyCalibration`] if nothing was observed.
    pub fn bounds(&self) -> Result<(f64, f64)> {
        if self.initialized {
            Ok((self.min_value, self.max_value))
        } else {
            Err(QuantizationError::EmptyCalibration)
        }
    }
}
