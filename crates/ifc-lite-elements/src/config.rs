// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Session configuration

use crate::{GroupMode, SessionError};
use serde::{Deserialize, Serialize};

/// Default bound on hierarchy passes when grouping by structure
pub const DEFAULT_MAX_HIERARCHY_DEPTH: usize = 10;

/// Largest accepted hierarchy pass bound
pub const MAX_HIERARCHY_DEPTH: usize = 1000;

/// Default largest selection the single-item editor accepts
pub const DEFAULT_SINGLE_EDIT_LIMIT: usize = 3;

/// Configuration for a classification session
///
/// # Example
///
/// ```ignore
/// use ifc_lite_elements::{ElementsConfig, GroupMode};
///
/// let config = ElementsConfig::new()
///     .with_mode(GroupMode::ByStructure)
///     .with_visible_only(true);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
    /// Safety bound on structure passes. Containment data can be malformed or
    /// cyclic; elements still unplaced after this many passes are appended as
    /// pseudo-roots.
    pub max_hierarchy_depth: usize,
    /// Largest selection the single-item (per-cell) editor accepts
    pub single_edit_limit: usize,
    /// Only show visible elements when the session opens
    pub visible_only: bool,
    /// Grouping mode when the session opens
    pub default_mode: GroupMode,
    /// Label of the transaction wrapping an accepted session
    pub transaction_label: String,
    /// Name of the group the trash command moves elements into
    pub trash_group: String,
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: DEFAULT_MAX_HIERARCHY_DEPTH,
            single_edit_limit: DEFAULT_SINGLE_EDIT_LIMIT,
            visible_only: false,
            default_mode: GroupMode::None,
            transaction_label: "Change IFC elements".to_string(),
            trash_group: "Trash".to_string(),
        }
    }
}

impl ElementsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the hierarchy pass bound
    pub fn with_max_hierarchy_depth(mut self, depth: usize) -> Self {
        self.max_hierarchy_depth = depth;
        self
    }

    /// Set the single-item editor limit
    pub fn with_single_edit_limit(mut self, limit: usize) -> Self {
        self.single_edit_limit = limit;
        self
    }

    pub fn with_visible_only(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    pub fn with_mode(mut self, mode: GroupMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn with_transaction_label(mut self, label: impl Into<String>) -> Self {
        self.transaction_label = label.into();
        self
    }

    pub fn with_trash_group(mut self, name: impl Into<String>) -> Self {
        self.trash_group = name.into();
        self
    }

    /// Reject settings that would disable hierarchy building or editing
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.max_hierarchy_depth == 0 {
            return Err(SessionError::Config(
                "max_hierarchy_depth must be at least 1".to_string(),
            ));
        }
        if self.max_hierarchy_depth > MAX_HIERARCHY_DEPTH {
            return Err(SessionError::Config(format!(
                "max_hierarchy_depth must be at most {}",
                MAX_HIERARCHY_DEPTH
            )));
        }
        if self.single_edit_limit == 0 {
            return Err(SessionError::Config(
                "single_edit_limit must be at least 1".to_string(),
            ));
        }
        if self.trash_group.is_empty() {
            return Err(SessionError::Config("trash_group must not be empty".to_string()));
        }
        Ok(())
    }
}
