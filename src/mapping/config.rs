//! Configuration options for the parameter mapping engine.

/// Configuration options for computing parameter mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingConfig {
    /// Log unmapped placeholders and parameters through `tracing`. The
    /// warnings are returned with the result either way. Default: true
    pub warn_unmapped: bool,

    /// Report fixed parameter values on their parameter-table scale instead
    /// of linear scale. Default: false
    pub scaled_parameters: bool,

    /// Accept noise parameter overrides that differ between timepoints of the
    /// same (condition, observable) group, provided they are all numeric.
    /// Default: false
    pub allow_timepoint_specific_numeric_noise_parameters: bool,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            warn_unmapped: true,
            scaled_parameters: false,
            allow_timepoint_specific_numeric_noise_parameters: false,
        }
    }
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_warn_unmapped(mut self, warn_unmapped: bool) -> Self {
        self.warn_unmapped = warn_unmapped;
        self
    }

    pub fn with_scaled_parameters(mut self, scaled_parameters: bool) -> Self {
        self.scaled_parameters = scaled_parameters;
        self
    }

    pub fn with_timepoint_specific_numeric_noise_parameters(mut self, allow: bool) -> Self {
        self.allow_timepoint_specific_numeric_noise_parameters = allow;
        self
    }
}
