//! Store configuration.

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::hash::bucket_count_for;

/// Configuration for a [`Store`](crate::Store).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Minimum number of hash buckets. Rounded up to the next power of two
    /// at construction; the table never grows or shrinks afterward.
    pub min_buckets: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { min_buckets: 4096 }
    }
}

impl StoreConfig {
    /// The actual bucket count the table will be built with.
    pub fn bucket_count(&self) -> usize {
        bucket_count_for(self.min_buckets)
    }

    /// Parse a configuration from a TOML document.
    pub fn from_toml_str(s: &str) -> StoreResult<Self> {
        toml::from_str(s).map_err(|e| StoreError::InvalidArgument(e.to_string()))
    }
}
