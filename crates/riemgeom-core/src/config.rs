//! Runtime configuration for batched execution.
//!
//! Batched geometric operations have no cross-element data dependency, so a
//! batch can be split across threads. This module decides when doing so is
//! worthwhile. Thresholds can be overridden once per process through
//! [`set_parallel_config`].

use std::sync::OnceLock;

/// Global configuration for batch parallelism
static GLOBAL_CONFIG: OnceLock<ParallelConfig> = OnceLock::new();

/// Configuration for parallel execution of batched operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParallelConfig {
    /// Whether batched operations may run in parallel at all
    pub enabled: bool,

    /// Minimum number of batch elements before work is split across threads
    pub min_batch_len: usize,

    /// Number of available threads (cached)
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        let num_threads = available_threads();

        // Each element costs at least one eigendecomposition for matrix
        // manifolds, so batches become worth splitting quickly. Scale with
        // thread count to amortize scheduling overhead.
        let base_min_batch: u32 = 8;
        let thread_scaling = (num_threads as f64).sqrt();

        Self {
            enabled: cfg!(feature = "parallel"),
            min_batch_len: (f64::from(base_min_batch) * thread_scaling) as usize,
            num_threads,
        }
    }
}

impl ParallelConfig {
    /// Configuration that always runs sequentially.
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check if a batch of `batch_len` elements should be processed in parallel
    pub fn should_parallelize_batch(&self, batch_len: usize) -> bool {
        self.enabled && self.num_threads > 1 && batch_len >= self.min_batch_len
    }
}

/// Builder for customizing the parallel configuration
#[derive(Debug, Clone)]
pub struct ParallelConfigBuilder {
    config: ParallelConfig,
}

impl Default for ParallelConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: ParallelConfig::default(),
        }
    }

    /// Enable or disable parallel execution
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled && cfg!(feature = "parallel");
        self
    }

    /// Set the minimum batch length for parallel execution
    pub fn min_batch_len(mut self, min_batch_len: usize) -> Self {
        self.config.min_batch_len = min_batch_len.max(1);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ParallelConfig {
        self.config
    }
}

/// Get the global parallel configuration
pub fn get_parallel_config() -> &'static ParallelConfig {
    GLOBAL_CONFIG.get_or_init(ParallelConfig::default)
}

/// Set a custom global parallel configuration.
///
/// Returns the rejected configuration if the global one was already
/// initialized.
pub fn set_parallel_config(config: ParallelConfig) -> Result<(), ParallelConfig> {
    GLOBAL_CONFIG.set(config)
}

#[cfg(feature = "parallel")]
fn available_threads() -> usize {
    rayon::current_num_threads()
}

#[cfg(not(feature = "parallel"))]
fn available_threads() -> usize {
    1
}
