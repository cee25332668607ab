//! Sizer configuration types.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Upper bound on the worker pool size.
pub const MAX_THREADS: usize = 512;

/// Configuration for a directory sizer.
#[derive(Debug, Clone, PartialEq, Eq, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SizerConfig {
    /// Number of worker threads (0 = rayon's default, one per CPU).
    #[builder(default = "0")]
    #[serde(default)]
    pub threads: usize,

    /// Count a file with several hard links only once per invocation.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub count_hardlinks_once: bool,
}

fn default_true() -> bool {
    true
}

impl SizerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(threads) = self.threads {
            if threads > MAX_THREADS {
                return Err(format!(
                    "threads must be at most {MAX_THREADS}, got {threads}"
                ));
            }
        }
        Ok(())
    }
}

impl SizerConfig {
    /// Create a new sizer config builder.
    pub fn builder() -> SizerConfigBuilder {
        SizerConfigBuilder::default()
    }
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            count_hardlinks_once: true,
        }
    }
}
