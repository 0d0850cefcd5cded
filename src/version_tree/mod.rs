//! Branching version history of mutable structured data.
//!
//! A [`VersionTree`] holds one or more branches of [`VersionName`] chains
//! growing from a root. Each branch keeps at most `max_versions` entries and a
//! tree holds at most `max_branches` branches. A [`VersionTreeTable`] owns one
//! tree per object name and serialises access per name.
//!
//! [`VersionName`]: crate::nfs_protocol::VersionName

mod table;
mod tree;

pub use table::VersionTreeTable;
pub use tree::VersionTree;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::nfs_protocol::{CommonError, ErrorCode, VaultError};

/// Default number of versions retained per branch.
pub const DEFAULT_MAX_VERSIONS: u32 = 100;

/// Default number of branches per tree.
pub const DEFAULT_MAX_BRANCHES: u32 = 10;

/// Errors raised by version tree operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionTreeError {
    /// A limit is zero, or a new version does not follow its predecessor.
    #[error("invalid argument")]
    InvalidArgument,

    /// A tree already exists for the name.
    #[error("version tree already exists")]
    AlreadyExists,

    /// The referenced version is not in any branch.
    #[error("version not found")]
    VersionNotFound,

    /// A fork would exceed the tree's branch limit.
    #[error("maximum number of branches exceeded")]
    MaxBranchesExceeded,

    /// No tree exists for the name.
    #[error("version tree not found")]
    NotFound,
}

impl VersionTreeError {
    /// Domain error code reported to remote callers.
    #[must_use]
    pub const fn to_error_code(self) -> ErrorCode {
        match self {
            Self::InvalidArgument => ErrorCode::General(CommonError::InvalidArgument),
            Self::AlreadyExists => ErrorCode::StorageNode(VaultError::DataAlreadyExists),
            Self::VersionNotFound => ErrorCode::StorageNode(VaultError::NoSuchVersion),
            Self::MaxBranchesExceeded => ErrorCode::StorageNode(VaultError::TooManyBranches),
            Self::NotFound => ErrorCode::StorageNode(VaultError::NoSuchVersionTree),
        }
    }

    /// Recover the tree error a remote persona reported, if `code` is one.
    #[must_use]
    pub const fn from_error_code(code: ErrorCode) -> Option<Self> {
        match code {
            ErrorCode::General(CommonError::InvalidArgument) => Some(Self::InvalidArgument),
            ErrorCode::StorageNode(VaultError::DataAlreadyExists) => Some(Self::AlreadyExists),
            ErrorCode::StorageNode(VaultError::NoSuchVersion) => Some(Self::VersionNotFound),
            ErrorCode::StorageNode(VaultError::TooManyBranches) => {
                Some(Self::MaxBranchesExceeded)
            }
            ErrorCode::StorageNode(VaultError::NoSuchVersionTree) => Some(Self::NotFound),
            _ => None,
        }
    }
}

impl From<VersionTreeError> for ErrorCode {
    fn from(error: VersionTreeError) -> Self {
        error.to_error_code()
    }
}

/// Retention and branching limits of a version tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTreeLimits {
    /// Entries retained per branch; older entries are evicted.
    #[serde(default = "default_max_versions")]
    pub max_versions: u32,

    /// Maximum number of branches.
    #[serde(default = "default_max_branches")]
    pub max_branches: u32,
}

impl VersionTreeLimits {
    /// Create limits.
    #[must_use]
    pub const fn new(max_versions: u32, max_branches: u32) -> Self {
        Self {
            max_versions,
            max_branches,
        }
    }

    /// Check both limits are at least one.
    ///
    /// # Errors
    ///
    /// Returns [`VersionTreeError::InvalidArgument`] otherwise.
    pub const fn validate(&self) -> Result<(), VersionTreeError> {
        if self.max_versions < 1 || self.max_branches < 1 {
            return Err(VersionTreeError::InvalidArgument);
        }
        Ok(())
    }
}

impl Default for VersionTreeLimits {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VERSIONS, DEFAULT_MAX_BRANCHES)
    }
}

const fn default_max_versions() -> u32 {
    DEFAULT_MAX_VERSIONS
}

const fn default_max_branches() -> u32 {
    DEFAULT_MAX_BRANCHES
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_validation() {
        assert!(VersionTreeLimits::default().validate().is_ok());
        assert!(VersionTreeLimits::new(1, 1).validate().is_ok());
        assert_eq!(
            VersionTreeLimits::new(0, 1).validate(),
            Err(VersionTreeError::InvalidArgument)
        );
        assert_eq!(
            VersionTreeLimits::new(5, 0).validate(),
            Err(VersionTreeError::InvalidArgument)
        );
    }

    #[test]
    fn test_error_code_mapping_is_reversible() {
        for error in [
            VersionTreeError::InvalidArgument,
            VersionTreeError::AlreadyExists,
            VersionTreeError::VersionNotFound,
            VersionTreeError::MaxBranchesExceeded,
            VersionTreeError::NotFound,
        ] {
            assert_eq!(
                VersionTreeError::from_error_code(error.to_error_code()),
                Some(error)
            );
        }
        assert_eq!(
            VersionTreeError::from_error_code(ErrorCode::StorageNode(VaultError::NoSuchData)),
            None
        );
    }
}
