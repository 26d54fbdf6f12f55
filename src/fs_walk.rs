//! Filesystem walker and materializer (C6): directory tree on disk ↔
//! [`Tree`], grounded on `Vault::read_from_dir`'s explicit-stack walk
//! (symlink rejection first, then regular-file/directory dispatch) and on
//! `Directory::create`/`File::create` for materialization.

use std::fs;
use std::path::Path;

use crate::base64;
use crate::error::VaultError;
use crate::tree::{validate_name, Tree, TreeNode};

/// Walk `root` depth-first into a [`Tree`] named `name`.
///
/// Symlinks and anything that is neither a regular file nor a directory
/// (sockets, devices, FIFOs) fail with [`VaultError::UnsupportedEntry`].
pub fn walk(root: &Path, name: &str) -> Result<Tree, VaultError> {
    validate_name(name)?;
    let children = walk_children(root)?;
    Ok(Tree::new(name, children))
}

fn walk_children(dir: &Path) -> Result<Vec<TreeNode>, VaultError> {
    let mut children = Vec::new();

    let entries = fs::read_dir(dir).map_err(|e| VaultError::io_at(e, dir))?;
    for entry in entries {
        let entry = entry.map_err(|e| VaultError::io_at(e, dir))?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy().into_owned();
        validate_name(&file_name)?;

        let file_type = entry.file_type().map_err(|e| VaultError::io_at(e, &path))?;

        if file_type.is_symlink() {
            return Err(VaultError::UnsupportedEntry {
                path,
                reason: "symlinks are not supported".into(),
            });
        } else if file_type.is_file() {
            tracing::debug!(path = %path.display(), "walked file");
            let bytes = fs::read(&path).map_err(|e| VaultError::io_at(e, &path))?;
            children.push(TreeNode::File {
                name: file_name,
                data: base64::encode(&bytes),
            });
        } else if file_type.is_dir() {
            tracing::debug!(path = %path.display(), "walked directory");
            let grandchildren = walk_children(&path)?;
            children.push(TreeNode::Directory { name: file_name, children: grandchildren });
        } else {
            return Err(VaultError::UnsupportedEntry {
                path,
                reason: "not a regular file or directory".into(),
            });
        }
    }

    Ok(children)
}

fn materialize_node(node: &TreeNode, parent: &Path) -> Result<(), VaultError> {
    match node {
        TreeNode::File { name, data } => {
            let path = parent.join(name);
            tracing::debug!(path = %path.display(), "materializing file");
            let bytes = base64::decode(data)?;
            fs::write(&path, bytes).map_err(|e| VaultError::io_at(e, &path))
        }
        TreeNode::Directory { name, children } => {
            let path = parent.join(name);
            tracing::debug!(path = %path.display(), "materializing directory");
            fs::create_dir_all(&path).map_err(|e| VaultError::io_at(e, &path))?;
            for child in children {
                materialize_node(child, &path)?;
            }
            Ok(())
        }
    }
}

/// Materialize `tree` at `root` (the vault root's own directory path,
/// e.g. `destination/vault_name`): create `root` and then, depth-first,
/// each child.
pub fn materialize(tree: &Tree, root: &Path) -> Result<(), VaultError> {
    fs::create_dir_all(root).map_err(|e| VaultError::io_at(e, root))?;
    for child in &tree.children {
        materialize_node(child, root)?;
    }
    Ok(())
}
