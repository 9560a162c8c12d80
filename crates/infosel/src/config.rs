use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::feature_selection::Criterion;

/// Configuration for one selection run.
///
/// ```json
/// {
///     "criterion": { "name": "betagamma", "beta": 0.5, "gamma": 0.5 },
///     "num_features": 10,
///     "parallel": true
/// }
/// ```
///
/// Missing keys fall back to [`SelectionConfig::default`].
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectionConfig {
    pub criterion: Criterion,
    /// Number of features to select; `None` ranks every feature.
    pub num_features: Option<usize>,
    /// Score candidates on the rayon thread pool.
    pub parallel: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        SelectionConfig {
            criterion: Criterion::default(),
            num_features: None,
            parallel: true,
        }
    }
}

impl SelectionConfig {
    pub fn new(criterion: Criterion, num_features: Option<usize>) -> Self {
        SelectionConfig {
            criterion,
            num_features,
            ..Default::default()
        }
    }
}

/// Load a [`SelectionConfig`] from a JSON file.
pub fn load_selection_config<P: AsRef<Path>>(path: P) -> Result<SelectionConfig> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.as_ref().display()))?;
    let config: SelectionConfig = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse config: {}", path.as_ref().display()))?;
    Ok(config)
}
