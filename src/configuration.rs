use std::fs::File;
use std::io::BufReader;

use serde::{
    Deserialize,
    Serialize
};

use crate::configurationerror::ConfigurationError;

/// Tunables of the curve algorithms. None of them changes a result, only how
/// it is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComputationSettings {
    parallelization_threshold: usize,
    parallel_sort_threshold: usize,
    simplification_threshold: usize,
    use_shape_fast_paths: bool,
    max_closure_iterations: usize
}

impl Default for ComputationSettings {
    fn default() -> Self {
        ComputationSettings {
            parallelization_threshold: 4096,
            parallel_sort_threshold: 8192,
            simplification_threshold: 1024,
            use_shape_fast_paths: true,
            max_closure_iterations: 64
        }
    }
}

impl ComputationSettings {
    pub fn new() -> ComputationSettings {
        ComputationSettings::default()
    }

    /// Number of element pairs above which a Cartesian product is split into
    /// chunks evaluated on the rayon pool.
    pub fn parallelization_threshold(&self) -> usize {
        self.parallelization_threshold
    }

    pub fn parallel_sort_threshold(&self) -> usize {
        self.parallel_sort_threshold
    }

    /// Partial envelopes longer than this are simplified before being merged.
    pub fn simplification_threshold(&self) -> usize {
        self.simplification_threshold
    }

    pub fn use_shape_fast_paths(&self) -> bool {
        self.use_shape_fast_paths
    }

    pub fn max_closure_iterations(&self) -> usize {
        self.max_closure_iterations
    }

    pub fn with_parallelization_threshold(mut self, threshold: usize) -> ComputationSettings {
        self.parallelization_threshold = threshold;
        self
    }

    pub fn with_parallel_sort_threshold(mut self, threshold: usize) -> ComputationSettings {
        self.parallel_sort_threshold = threshold;
        self
    }

    pub fn with_simplification_threshold(mut self, threshold: usize) -> ComputationSettings {
        self.simplification_threshold = threshold;
        self
    }

    pub fn with_shape_fast_paths(mut self, enabled: bool) -> ComputationSettings {
        self.use_shape_fast_paths = enabled;
        self
    }

    pub fn with_max_closure_iterations(mut self, iterations: usize) -> ComputationSettings {
        self.max_closure_iterations = iterations;
        self
    }

    pub fn from_json(json_value: serde_json::Value) -> Result<ComputationSettings, ConfigurationError> {
        ConfigurationError::from_json_or_json_parse_error(json_value)
    }

    pub fn from_reader(file_path: &str) -> Result<ComputationSettings, ConfigurationError> {
        let file = File::open(file_path)?;
        let reader = BufReader::new(file);
        let settings: ComputationSettings = serde_json::from_reader(reader)?;
        tracing::debug!(?settings, file_path, "loaded computation settings");
        Ok(settings)
    }
}
