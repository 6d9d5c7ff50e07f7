//! Remote file tree nodes

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    File,
    Folder,
    #[serde(other)]
    Other,
}

/// A node of the remote project tree.
///
/// The flat listing returns nodes without children; the hierarchical form
/// nests children under folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteNode {
    pub path: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RemoteNode>,
}

impl RemoteNode {
    pub fn file(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            node_type: NodeType::File,
            name: None,
            children: Vec::new(),
        }
    }

    pub fn folder(path: impl Into<String>, children: Vec<RemoteNode>) -> Self {
        Self {
            path: path.into(),
            node_type: NodeType::Folder,
            name: None,
            children,
        }
    }

    pub fn is_file(&self) -> bool {
        self.node_type == NodeType::File
    }

    pub fn is_folder(&self) -> bool {
        self.node_type == NodeType::Folder
    }

    /// Explicit name if the service sent one, otherwise the last path segment
    pub fn base_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => crate::storage::base_name(&self.path),
        }
    }
}
