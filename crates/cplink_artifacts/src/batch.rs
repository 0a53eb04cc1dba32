use std::fmt::{self, Display};
use std::str::FromStr;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::errors::BatchSizeError;

#[cfg(test)]
#[path = "batch_test.rs"]
mod batch_test;

const MAX_BATCH_SIZE_LOG2: u32 = 16;
const SWEEP_MIN_LOG2: u32 = 1;
const SWEEP_MAX_LOG2: u32 = 10;

/// Number of aggregated statements verified by one contract call. Always a power of two.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BatchSize {
    log2: u32,
}

impl BatchSize {
    pub const MAX: u32 = 1 << MAX_BATCH_SIZE_LOG2;

    pub fn new(size: u32) -> Result<Self, BatchSizeError> {
        if !size.is_power_of_two() {
            return Err(BatchSizeError::NotPowerOfTwo(size));
        }
        if size > Self::MAX {
            return Err(BatchSizeError::TooLarge { size, max: Self::MAX });
        }
        Ok(Self { log2: size.trailing_zeros() })
    }

    pub fn from_log2(log2: u32) -> Result<Self, BatchSizeError> {
        let size = 1_u32
            .checked_shl(log2)
            .ok_or(BatchSizeError::TooLarge { size: u32::MAX, max: Self::MAX })?;
        Self::new(size)
    }

    pub fn get(self) -> usize {
        1 << self.log2
    }

    pub fn log2(self) -> u32 {
        self.log2
    }

    /// The batch sizes benchmarked by a default sweep: 2, 4, ..., 1024.
    pub fn sweep() -> impl Iterator<Item = Self> {
        (SWEEP_MIN_LOG2..=SWEEP_MAX_LOG2).map(|log2| Self { log2 })
    }
}

impl From<BatchSize> for u32 {
    fn from(batch_size: BatchSize) -> Self {
        1 << batch_size.log2
    }
}

impl From<BatchSize> for U256 {
    fn from(batch_size: BatchSize) -> Self {
        U256::from(u32::from(batch_size))
    }
}

impl TryFrom<u32> for BatchSize {
    type Error = BatchSizeError;

    fn try_from(size: u32) -> Result<Self, Self::Error> {
        Self::new(size)
    }
}

impl FromStr for BatchSize {
    type Err = BatchSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = s.trim().parse().map_err(|_| BatchSizeError::Unparsable(s.to_string()))?;
        Self::new(size)
    }
}

impl Display for BatchSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u32::from(*self))
    }
}

/// A flattened argument split into a fixed anchor segment and a segment repeated once per
/// aggregated statement.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArgumentTemplate {
    anchor: Vec<U256>,
    replicated: Vec<U256>,
}

impl ArgumentTemplate {
    pub fn new(anchor: Vec<U256>, replicated: Vec<U256>) -> Self {
        Self { anchor, replicated }
    }

    /// An argument that does not grow with the batch.
    pub fn fixed(words: Vec<U256>) -> Self {
        Self::new(words, Vec::new())
    }

    /// An argument made only of per-statement words.
    pub fn per_statement(words: Vec<U256>) -> Self {
        Self::new(Vec::new(), words)
    }

    pub fn anchor(&self) -> &[U256] {
        &self.anchor
    }

    pub fn replicated(&self) -> &[U256] {
        &self.replicated
    }

    pub fn expanded_len(&self, batch_size: BatchSize) -> usize {
        self.anchor.len() + batch_size.get() * self.replicated.len()
    }

    /// The anchor followed by `batch_size` copies of the replicated segment.
    pub fn expand(&self, batch_size: BatchSize) -> Vec<U256> {
        let mut words = Vec::with_capacity(self.expanded_len(batch_size));
        words.extend_from_slice(&self.anchor);
        for _ in 0..batch_size.get() {
            words.extend_from_slice(&self.replicated);
        }
        words
    }
}
