//! Form data submitted by the web front end for creating and renaming nodes.

use crate::models::{TreeNode, ValidationError};
use serde::Deserialize;

/// Command object for the create, edit and add-child forms
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TreeNodeForm {
    /// Requested node name; missing and empty are both rejected by `validate`
    #[serde(default)]
    pub name: Option<String>,
}

impl TreeNodeForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    /// Prefill the form from an existing node
    pub fn from_node(node: &TreeNode) -> Self {
        Self::new(node.name())
    }

    /// Submitted name, empty when missing
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(())
    }
}
