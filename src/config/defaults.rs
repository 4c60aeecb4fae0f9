//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Treat warnings as failures (default: false)
    pub strict: bool,

    /// Index named in render failure messages (default: "PyPI")
    pub index_name: String,

    /// Drop `.asc` signature files from the checked set (default: true)
    pub skip_signatures: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            strict: false,
            index_name: "PyPI".to_string(),
            skip_signatures: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "strict": self.strict,
            "index_name": self.index_name,
            "skip_signatures": self.skip_signatures,
        })
    }
}
