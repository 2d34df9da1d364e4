//! Data Models
//!
//! This module contains the core data structures of the tree domain:
//!
//! - `TreeNode` - Named node owning its children, with parent snapshot and depth
//! - `TreeNodeForm` - Name-only command object submitted by the web forms

mod form;
mod node;


pub use form::TreeNodeForm;
pub use node::{ParentRef, PreOrder, TreeNode, ValidationError, UUID_LENGTH};
