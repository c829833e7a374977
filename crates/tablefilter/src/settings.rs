//! # Settings
//!
//! Behaviour switches shared by every editor of a coordinator. A
//! [`FilterSettings`] value is handed to [`crate::FilterCoordinator::new`];
//! there is no process-wide default instance.
//!
//! Settings are resolved in priority order:
//! 1. **Environment variables**: `TABLEFILTER_IGNORE_CASE`, `TABLEFILTER_MAX_HISTORY`, etc.
//! 2. **Settings file**: a TOML file passed to [`FilterSettings::load`].
//! 3. **Compiled defaults**: built-in fallbacks via `#[config(default = ...)]`.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `adaptive_choices` | `true` | Restrict choices to values reachable under the other filters |
//! | `auto_choices` | `"enums"` | Where choices come from: `disabled`, `enums`, `enabled` |
//! | `auto_completion` | `true` | Complete partial input from history and choices |
//! | `auto_selection` | `true` | Select the only visible row after filtering |
//! | `filter_on_updates` | `true` | Re-filter rows whose values are updated |
//! | `ignore_case` | `true` | Compare text case-insensitively |
//! | `instant_filtering` | `true` | Apply filters while the user types |
//! | `allow_instant_vanishing` | `false` | Let instant edits hide every row |
//! | `max_history` | `2` | Entries kept in each editor's history |
//! | `max_visible_choices` | `8` | Choices shown at once |
//! | `match_empty_label` | `"="` | Label of the choice selecting empty cells |

use crate::editor::AutoChoices;
use crate::error::Result;
use confique::Config;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct FilterSettings {
    /// Restrict each column's choices to values still reachable under the
    /// other active filters.
    #[config(default = true, env = "TABLEFILTER_ADAPTIVE_CHOICES")]
    pub adaptive_choices: bool,

    #[config(default = "enums", env = "TABLEFILTER_AUTO_CHOICES")]
    pub auto_choices: AutoChoices,

    #[config(default = true, env = "TABLEFILTER_AUTO_COMPLETION")]
    pub auto_completion: bool,

    /// Select the row when filtering leaves exactly one visible.
    #[config(default = true, env = "TABLEFILTER_AUTO_SELECTION")]
    pub auto_selection: bool,

    #[config(default = true, env = "TABLEFILTER_FILTER_ON_UPDATES")]
    pub filter_on_updates: bool,

    #[config(default = true, env = "TABLEFILTER_IGNORE_CASE")]
    pub ignore_case: bool,

    #[config(default = true, env = "TABLEFILTER_INSTANT_FILTERING")]
    pub instant_filtering: bool,

    /// Apply instant edits even when they leave no row visible.
    #[config(default = false, env = "TABLEFILTER_ALLOW_INSTANT_VANISHING")]
    pub allow_instant_vanishing: bool,

    #[config(default = 2, env = "TABLEFILTER_MAX_HISTORY")]
    pub max_history: usize,

    #[config(default = 8, env = "TABLEFILTER_MAX_VISIBLE_CHOICES")]
    pub max_visible_choices: usize,

    #[config(default = "=", env = "TABLEFILTER_MATCH_EMPTY_LABEL")]
    pub match_empty_label: String,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            adaptive_choices: true,
            auto_choices: AutoChoices::Enums,
            auto_completion: true,
            auto_selection: true,
            filter_on_updates: true,
            ignore_case: true,
            instant_filtering: true,
            allow_instant_vanishing: false,
            max_history: 2,
            max_visible_choices: 8,
            match_empty_label: "=".to_string(),
        }
    }
}

impl FilterSettings {
    /// Loads settings from `path` (if it exists), layered under the
    /// environment and over the compiled defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let settings = Self::builder().env().file(path).load()?;
        Ok(settings)
    }
}
