//! Table of version trees keyed by object name.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::{VersionTree, VersionTreeError, VersionTreeLimits};
use crate::nfs_protocol::{DataName, VersionName};

/// Owns one [`VersionTree`] per name.
///
/// The outer lock is only held to look a tree up or insert one; each tree has
/// its own lock, so operations on different names never wait on each other.
/// Readers of one name run concurrently and see a consistent snapshot.
#[derive(Debug, Default)]
pub struct VersionTreeTable {
    trees: RwLock<HashMap<DataName, Arc<RwLock<VersionTree>>>>,
}

impl VersionTreeTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the tree for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::InvalidArgument`] for zero limits and
    /// [`VersionTreeError::AlreadyExists`] if `name` already has a tree.
    pub fn create_version_tree(
        &self,
        name: DataName,
        root: VersionName,
        limits: VersionTreeLimits,
    ) -> Result<(), VersionTreeError> {
        let tree = VersionTree::new(root, limits)?;
        match self.trees.write().entry(name) {
            Entry::Occupied(_) => Err(VersionTreeError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(RwLock::new(tree)));
                debug!(
                    "Created version tree {} (max_versions={}, max_branches={})",
                    name, limits.max_versions, limits.max_branches
                );
                Ok(())
            }
        }
    }

    /// Append `new` after `old` in the tree for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::NotFound`] if `name` has no tree, or any
    /// error of [`VersionTree::put_version`].
    pub fn put_version(
        &self,
        name: &DataName,
        old: &VersionName,
        new: VersionName,
    ) -> Result<VersionName, VersionTreeError> {
        let tree = self.tree(name)?;
        let tip = tree.write().put_version(old, new)?;
        debug!("Put version {} -> {} on {}", old, tip, name);
        Ok(tip)
    }

    /// Tips of every branch of the tree for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::NotFound`] if `name` has no tree.
    pub fn get_versions(&self, name: &DataName) -> Result<Vec<VersionName>, VersionTreeError> {
        Ok(self.tree(name)?.read().tips())
    }

    /// Branch of the tree for `name` ending at `tip`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::NotFound`] if `name` has no tree and
    /// [`VersionTreeError::VersionNotFound`] if `tip` is not a branch tip.
    pub fn get_branch(
        &self,
        name: &DataName,
        tip: &VersionName,
    ) -> Result<Vec<VersionName>, VersionTreeError> {
        self.tree(name)?.read().branch(tip)
    }

    /// Drop the tree for `name`. Returns whether one existed.
    pub fn remove(&self, name: &DataName) -> bool {
        self.trees.write().remove(name).is_some()
    }

    /// Whether `name` has a tree.
    #[must_use]
    pub fn contains(&self, name: &DataName) -> bool {
        self.trees.read().contains_key(name)
    }

    /// Number of trees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.trees.read().len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.trees.read().is_empty()
    }

    fn tree(&self, name: &DataName) -> Result<Arc<RwLock<VersionTree>>, VersionTreeError> {
        self.trees
            .read()
            .get(name)
            .cloned()
            .ok_or(VersionTreeError::NotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::nfs_protocol::DataTagValue;

    fn name(byte: u8) -> DataName {
        DataName::new(DataTagValue::OwnerDirectory, [byte; 32])
    }

    fn version(index: u64) -> VersionName {
        VersionName::new(index, [u8::try_from(index % 251).unwrap_or(0); 32])
    }

    #[test]
    fn test_create_twice_fails() {
        let table = VersionTreeTable::new();
        table
            .create_version_tree(name(1), version(0), VersionTreeLimits::new(5, 1))
            .expect("create");
        assert_eq!(
            table.create_version_tree(name(1), version(0), VersionTreeLimits::new(5, 1)),
            Err(VersionTreeError::AlreadyExists)
        );
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_invalid_limits_create_nothing() {
        let table = VersionTreeTable::new();
        assert_eq!(
            table.create_version_tree(name(1), version(0), VersionTreeLimits::new(0, 1)),
            Err(VersionTreeError::InvalidArgument)
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_operations_on_absent_tree() {
        let table = VersionTreeTable::new();
        assert_eq!(
            table.get_versions(&name(9)),
            Err(VersionTreeError::NotFound)
        );
        assert_eq!(
            table.get_branch(&name(9), &version(0)),
            Err(VersionTreeError::NotFound)
        );
        assert_eq!(
            table.put_version(&name(9), &version(0), version(1)),
            Err(VersionTreeError::NotFound)
        );
    }

    #[test]
    fn test_put_and_query() {
        let table = VersionTreeTable::new();
        table
            .create_version_tree(name(1), version(0), VersionTreeLimits::new(5, 1))
            .expect("create");
        for i in 0..3 {
            table
                .put_version(&name(1), &version(i), version(i + 1))
                .expect("put");
        }

        assert_eq!(table.get_versions(&name(1)).expect("versions"), vec![version(3)]);
        assert_eq!(
            table.get_branch(&name(1), &version(3)).expect("branch"),
            vec![version(3), version(2), version(1), version(0)]
        );
    }

    #[test]
    fn test_remove() {
        let table = VersionTreeTable::new();
        table
            .create_version_tree(name(1), version(0), VersionTreeLimits::default())
            .expect("create");
        assert!(table.contains(&name(1)));
        assert!(table.remove(&name(1)));
        assert!(!table.remove(&name(1)));
        assert!(!table.contains(&name(1)));
    }

    #[test]
    fn test_concurrent_names_are_independent() {
        let table = Arc::new(VersionTreeTable::new());
        let handles: Vec<_> = (0..8u8)
            .map(|n| {
                let table = Arc::clone(&table);
                std::thread::spawn(move || {
                    table
                        .create_version_tree(name(n), version(0), VersionTreeLimits::new(10, 1))
                        .expect("create");
                    for i in 0..20 {
                        table
                            .put_version(&name(n), &version(i), version(i + 1))
                            .expect("put");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread");
        }

        assert_eq!(table.len(), 8);
        for n in 0..8u8 {
            let branch = table
                .get_branch(&name(n), &version(20))
                .expect("branch");
            assert_eq!(branch.len(), 10);
            assert_eq!(branch[0], version(20));
        }
    }
}
