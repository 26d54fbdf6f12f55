//! Tree model (C5): the in-memory directory/file tree shared by the
//! filesystem walker and the archive parser.
//!
//! Ported from the File/Directory split in
//! `examples/original_source/include/Node.h` — a class hierarchy there,
//! a sum type here, per DESIGN NOTES' explicit instruction to prefer a
//! tagged variant over a base-class/subclass pair.

use crate::document::{Document, Tag};
use crate::error::VaultError;

/// Validate a node name against the tree model's invariants: a single path
/// component, non-empty, not `.`/`..`, and free of `"` (which the writer
/// relies on never needing to escape in an attribute value).
pub fn validate_name(name: &str) -> Result<(), VaultError> {
    if name.is_empty() {
        return Err(VaultError::BadArchive("node name must not be empty".into()));
    }
    if name == "." || name == ".." {
        return Err(VaultError::BadArchive(format!("invalid node name '{name}'")));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(VaultError::BadArchive(format!(
            "node name '{name}' must be a single path component"
        )));
    }
    if name.contains('"') {
        return Err(VaultError::BadArchive(format!(
            "node name '{name}' contains an unsupported '\"' character"
        )));
    }
    Ok(())
}

fn check_unique_children(parent: &str, children: &[TreeNode]) -> Result<(), VaultError> {
    for (i, a) in children.iter().enumerate() {
        for b in &children[..i] {
            if a.name() == b.name() {
                return Err(VaultError::BadArchive(format!(
                    "duplicate child name '{}' in directory '{parent}'",
                    a.name()
                )));
            }
        }
    }
    Ok(())
}

/// A single node in the vault's in-memory tree. A `File`'s `data` is kept
/// in its base64-encoded form throughout — this is the form the archive
/// carries, and it is only decoded once, at materialization time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNode {
    File { name: String, data: String },
    Directory { name: String, children: Vec<TreeNode> },
}

impl TreeNode {
    pub fn name(&self) -> &str {
        match self {
            TreeNode::File { name, .. } => name,
            TreeNode::Directory { name, .. } => name,
        }
    }

    /// Serialize this node to its `file`/`directory` document form.
    pub fn to_document(&self) -> Document {
        match self {
            TreeNode::File { name, data } => Document::new(
                Tag::File,
                vec![("name".into(), name.clone()), ("data".into(), data.clone())],
                Vec::new(),
            ),
            TreeNode::Directory { name, children } => Document::new(
                Tag::Directory,
                vec![("name".into(), name.clone())],
                children.iter().map(TreeNode::to_document).collect(),
            ),
        }
    }

    /// Build a tree node from a parsed `file`/`directory` document.
    /// Any other tag is a structural error owned by the caller.
    pub fn from_document(doc: &Document) -> Result<TreeNode, VaultError> {
        match doc.tag {
            Tag::File => {
                let name = doc.attr("name").to_string();
                validate_name(&name)?;
                Ok(TreeNode::File { name, data: doc.attr("data").to_string() })
            }
            Tag::Directory => {
                let name = doc.attr("name").to_string();
                validate_name(&name)?;
                let mut children = Vec::with_capacity(doc.children.len());
                for child in &doc.children {
                    children.push(TreeNode::from_document(child)?);
                }
                check_unique_children(&name, &children)?;
                Ok(TreeNode::Directory { name, children })
            }
            other => Err(VaultError::BadArchive(format!(
                "unexpected tag '{}' inside vault tree",
                other.name()
            ))),
        }
    }
}

/// The vault root: always conceptually a directory, carrying the vault's
/// name (used as the on-disk directory/file stem) and its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tree {
    pub name: String,
    pub children: Vec<TreeNode>,
}

impl Tree {
    pub fn new(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Tree { name: name.into(), children }
    }

    pub fn to_document(&self) -> Document {
        Document::new(
            Tag::Vault,
            vec![("name".into(), self.name.clone())],
            self.children.iter().map(TreeNode::to_document).collect(),
        )
    }

    pub fn from_document(doc: &Document) -> Result<Tree, VaultError> {
        if doc.tag != Tag::Vault {
            return Err(VaultError::BadArchive(format!(
                "expected root tag 'vault', got '{}'",
                doc.tag.name()
            )));
        }
        let mut children = Vec::with_capacity(doc.children.len());
        for child in &doc.children {
            children.push(TreeNode::from_document(child)?);
        }
        Ok(Tree { name: doc.attr("name").to_string(), children })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document;

    #[test]
    fn tree_document_round_trip() {
        let tree = Tree::new(
            "v",
            vec![
                TreeNode::File { name: "a.txt".into(), data: "aGVsbG8=".into() },
                TreeNode::Directory {
                    name: "sub".into(),
                    children: vec![TreeNode::File { name: "b.bin".into(), data: "AP9/gA==".into() }],
                },
            ],
        );

        let doc = tree.to_document();
        let text = document::write(&doc);
        let reparsed = document::parse(&text).unwrap();
        let rebuilt = Tree::from_document(&reparsed).unwrap();
        assert_eq!(rebuilt, tree);
    }

    #[test]
    fn rejects_non_vault_root() {
        let doc = Document::new(Tag::Directory, vec![("name".into(), "x".into())], vec![]);
        assert!(matches!(Tree::from_document(&doc), Err(VaultError::BadArchive(_))));
    }
}
