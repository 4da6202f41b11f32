//! Apply kernel configuration

/// Configuration for [`apply`](crate::apply) and [`apply_row`](crate::apply_row)
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyConfig {
    /// Execution mode (sequential, parallel, adaptive)
    pub mode: ExecutionMode,

    /// Number of worker threads (0 = use the global rayon pool)
    ///
    /// A nonzero value runs on a dedicated pool of that size, built on first
    /// use and shared by later calls.
    pub num_threads: usize,

    /// Minimum range length for parallel execution in adaptive mode
    ///
    /// Default: 4096
    pub parallel_threshold: usize,

    /// Leakage above this is logged as a warning
    ///
    /// Default: `sqrt(f64::EPSILON)`
    pub leakage_warning_threshold: f64,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Adaptive,
            num_threads: 0,
            parallel_threshold: 1 << 12,
            leakage_warning_threshold: f64::EPSILON.sqrt(),
        }
    }
}

impl ApplyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always run on the calling thread
    pub fn sequential() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            ..Default::default()
        }
    }

    /// Always split the range across workers
    pub fn parallel() -> Self {
        Self {
            mode: ExecutionMode::Parallel,
            ..Default::default()
        }
    }

    /// Builder: set execution mode
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: use a dedicated pool with `num_threads` workers
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Builder: set parallel threshold
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Builder: set leakage warning threshold
    pub fn with_leakage_warning_threshold(mut self, threshold: f64) -> Self {
        self.leakage_warning_threshold = threshold;
        self
    }

    /// Number of workers this configuration runs on
    pub fn effective_threads(&self) -> usize {
        match self.num_threads {
            0 => rayon::current_num_threads(),
            n => n,
        }
    }

    /// Whether a range of `len` rows should be split across workers
    pub fn use_parallel(&self, len: usize) -> bool {
        match self.mode {
            ExecutionMode::Sequential => false,
            ExecutionMode::Parallel => true,
            ExecutionMode::Adaptive => {
                len >= self.parallel_threshold && self.effective_threads() > 1
            }
        }
    }
}

/// Execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Run on the calling thread
    Sequential,

    /// Split into one block per worker
    Parallel,

    /// Parallel for large ranges with more than one worker
    Adaptive,
}
