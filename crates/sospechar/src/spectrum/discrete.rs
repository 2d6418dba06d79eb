//! Discrete Spectra
//!
//! [`DiscreteSpectrumDebugger`] buckets continuous suspiciousness scores into
//! K equal-width bins over `[0, 1]` for an external renderer (one color per
//! bin, say). Locations without evidence land in the distinguished
//! [`Bucket::NoData`] — never coerced into the lowest numeric bin.

use super::{SpectrumDebugger, SuspiciousnessMetric};
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

/// Default number of bins (the classic red / yellow / green rendering)
pub const DEFAULT_BINS: usize = 3;

/// Bucket assignment of one location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    /// Numeric bin; 0 is least suspicious, K-1 most suspicious
    Bin(usize),
    /// No evidence for this location — distinct from the lowest bin
    NoData,
}

/// Bucketing policy for a discrete spectrum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketConfig {
    bins: usize,
}

impl BucketConfig {
    /// Create a builder for the bucketing policy
    #[must_use]
    pub fn builder() -> BucketConfigBuilder {
        BucketConfigBuilder::default()
    }

    /// Number of bins
    #[must_use]
    pub const fn bins(&self) -> usize {
        self.bins
    }
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self { bins: DEFAULT_BINS }
    }
}

/// Builder for the bucketing policy
#[derive(Debug, Default)]
pub struct BucketConfigBuilder {
    bins: usize,
}

impl BucketConfigBuilder {
    /// Set the number of bins
    #[must_use]
    pub const fn bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    /// Build the policy; zero bins falls back to the default
    #[must_use]
    pub fn build(self) -> BucketConfig {
        BucketConfig {
            bins: if self.bins == 0 {
                DEFAULT_BINS
            } else {
                self.bins
            },
        }
    }
}

/// Buckets a spectrum's continuous scores for external rendering
///
/// Wraps a [`SpectrumDebugger`] and derefs to it, so scoring and bucketing
/// read the same table state.
#[derive(Debug, Default)]
pub struct DiscreteSpectrumDebugger<M: SuspiciousnessMetric> {
    spectrum: SpectrumDebugger<M>,
    config: BucketConfig,
}

impl<M: SuspiciousnessMetric> DiscreteSpectrumDebugger<M> {
    /// Create a session with the given metric and the default bucketing
    #[must_use]
    pub fn new(metric: M) -> Self {
        Self::with_config(metric, BucketConfig::default())
    }

    /// Create a session with the given metric and bucketing policy
    #[must_use]
    pub fn with_config(metric: M, config: BucketConfig) -> Self {
        Self {
            spectrum: SpectrumDebugger::new(metric),
            config,
        }
    }

    /// Bucket an existing spectrum session
    #[must_use]
    pub const fn from_spectrum(spectrum: SpectrumDebugger<M>, config: BucketConfig) -> Self {
        Self { spectrum, config }
    }

    /// The bucketing policy in effect
    #[must_use]
    pub const fn config(&self) -> &BucketConfig {
        &self.config
    }

    /// Bucket assignment for one location
    ///
    /// Bins are half-open `[i/K, (i+1)/K)`; the top bin is closed so a score
    /// of 1.0 lands in bin K-1.
    #[must_use]
    pub fn bucket_for(&self, location: &Location) -> Bucket {
        match self.spectrum.suspiciousness(location) {
            Some(score) => {
                let bins = self.config.bins;
                let bin = ((score * bins as f64) as usize).min(bins - 1);
                Bucket::Bin(bin)
            }
            None => Bucket::NoData,
        }
    }

    /// Bucket assignments for every known location, in table order
    #[must_use]
    pub fn assignments(&self) -> Vec<(Location, Bucket)> {
        self.spectrum
            .locations()
            .map(|location| (location.clone(), self.bucket_for(location)))
            .collect()
    }
}

impl<M: SuspiciousnessMetric> Deref for DiscreteSpectrumDebugger<M> {
    type Target = SpectrumDebugger<M>;

    fn deref(&self) -> &Self::Target {
        &self.spectrum
    }
}

impl<M: SuspiciousnessMetric> DerefMut for DiscreteSpectrumDebugger<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.spectrum
    }
}
