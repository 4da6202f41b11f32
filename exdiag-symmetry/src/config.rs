//! Symmetry reduction configuration

/// Configuration for [`symmetry_reduce`](crate::symmetry_reduce) and friends
#[derive(Debug, Clone, PartialEq)]
pub struct ReductionConfig {
    /// Orbits whose stabilizer character sum is smaller than this are dropped
    ///
    /// Default: `sqrt(f64::EPSILON)`
    pub tolerance: f64,

    /// Compute orbits on the rayon pool
    ///
    /// Default: true
    pub parallel: bool,
}

impl Default for ReductionConfig {
    fn default() -> Self {
        Self {
            tolerance: f64::EPSILON.sqrt(),
            parallel: true,
        }
    }
}

impl ReductionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduce on the calling thread
    pub fn serial() -> Self {
        Self {
            parallel: false,
            ..Default::default()
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
