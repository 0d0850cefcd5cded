//! The branch model of a single versioned object.

use std::collections::VecDeque;

use super::{VersionTreeError, VersionTreeLimits};
use crate::nfs_protocol::VersionName;

/// Version history of one object.
///
/// Branches are kept in creation order. Each branch is stored oldest first,
/// so its tip is the back entry and eviction pops from the front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionTree {
    limits: VersionTreeLimits,
    branches: Vec<VecDeque<VersionName>>,
}

impl VersionTree {
    /// Create a tree holding only `root`.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::InvalidArgument`] if a limit is zero.
    pub fn new(root: VersionName, limits: VersionTreeLimits) -> Result<Self, VersionTreeError> {
        limits.validate()?;
        Ok(Self {
            limits,
            branches: vec![VecDeque::from([root])],
        })
    }

    /// Limits the tree was created with.
    #[must_use]
    pub const fn limits(&self) -> VersionTreeLimits {
        self.limits
    }

    /// Number of live branches.
    #[must_use]
    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Append `new` as the successor of `old` and return the new tip.
    ///
    /// If `old` is the tip of a branch, that branch grows; if it is an
    /// interior entry, a new branch is forked sharing the prefix up to `old`.
    /// Re-putting a pair that is already recorded succeeds without change and
    /// returns the current tip of the branch holding it.
    ///
    /// # Errors
    ///
    /// - [`VersionTreeError::InvalidArgument`] if `new.index` does not exceed
    ///   `old.index`, or `new` is already in the tree under another parent
    /// - [`VersionTreeError::VersionNotFound`] if `old` is in no branch
    /// - [`VersionTreeError::MaxBranchesExceeded`] if a fork is needed and the
    ///   tree is full
    pub fn put_version(
        &mut self,
        old: &VersionName,
        new: VersionName,
    ) -> Result<VersionName, VersionTreeError> {
        if new.index <= old.index {
            return Err(VersionTreeError::InvalidArgument);
        }

        if let Some(tip) = self.tip_after_edge(old, &new) {
            return Ok(tip);
        }
        if self.contains(&new) {
            return Err(VersionTreeError::InvalidArgument);
        }

        let max_versions = self.max_versions();

        if let Some(branch) = self.branches.iter_mut().find(|b| b.back() == Some(old)) {
            branch.push_back(new);
            while branch.len() > max_versions {
                branch.pop_front();
            }
            return Ok(new);
        }

        let (branch_index, position) = self
            .branches
            .iter()
            .enumerate()
            .find_map(|(i, branch)| branch.iter().position(|v| v == old).map(|p| (i, p)))
            .ok_or(VersionTreeError::VersionNotFound)?;

        if self.branches.len() >= self.max_branches() {
            return Err(VersionTreeError::MaxBranchesExceeded);
        }

        let mut forked: VecDeque<VersionName> = self.branches[branch_index]
            .iter()
            .take(position + 1)
            .copied()
            .collect();
        forked.push_back(new);
        self.branches.push(forked);
        Ok(new)
    }

    /// Tip of every branch, in branch creation order.
    #[must_use]
    pub fn tips(&self) -> Vec<VersionName> {
        self.branches
            .iter()
            .filter_map(|branch| branch.back().copied())
            .collect()
    }

    /// Retained entries of the branch ending at `tip`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::VersionNotFound`] if `tip` is not the tip of
    /// any branch.
    pub fn branch(&self, tip: &VersionName) -> Result<Vec<VersionName>, VersionTreeError> {
        self.branches
            .iter()
            .find(|branch| branch.back() == Some(tip))
            .map(|branch| branch.iter().rev().copied().collect())
            .ok_or(VersionTreeError::VersionNotFound)
    }

    fn contains(&self, version: &VersionName) -> bool {
        self.branches.iter().any(|branch| branch.contains(version))
    }

    /// Tip of the earliest branch in which `new` directly follows `old`.
    fn tip_after_edge(&self, old: &VersionName, new: &VersionName) -> Option<VersionName> {
        self.branches
            .iter()
            .find(|branch| {
                branch
                    .iter()
                    .zip(branch.iter().skip(1))
                    .any(|(a, b)| a == old && b == new)
            })
            .and_then(|branch| branch.back().copied())
    }

    fn max_versions(&self) -> usize {
        usize::try_from(self.limits.max_versions).unwrap_or(usize::MAX)
    }

    fn max_branches(&self) -> usize {
        usize::try_from(self.limits.max_branches).unwrap_or(usize::MAX)
    }
}
