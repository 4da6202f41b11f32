//! Basis enumeration configuration

/// Configuration for [`represent_with`](crate::represent_with)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentConfig {
    /// Enumerate branches of the most significant site in parallel
    ///
    /// Default: true
    pub parallel: bool,

    /// Minimum total bitwidth for the parallel path
    ///
    /// Small spaces are enumerated on the calling thread.
    ///
    /// Default: 16
    pub parallel_threshold: u32,
}

impl Default for RepresentConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            parallel_threshold: 16,
        }
    }
}

impl RepresentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always enumerate on the calling thread
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_parallel_threshold(mut self, bits: u32) -> Self {
        self.parallel_threshold = bits;
        self
    }

    /// Whether a space of `bitwidth` bits should be enumerated in parallel
    pub fn use_parallel(&self, bitwidth: u32) -> bool {
        self.parallel && bitwidth >= self.parallel_threshold && rayon::current_num_threads() > 1
    }
}
