//! Error types for the economy, storage and asset seams.
//!
//! None of these are fatal: shop errors are returned to the UI as a refused
//! action, storage and asset errors are logged and replaced by defaults.

use std::fmt;

use crate::tuning::UpgradeKey;

/// Why a shop action was refused. The session is untouched when one of these
/// is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// Not enough points for the purchase.
    InsufficientPoints { cost: u32, available: u32 },
    /// Upgrade is already at its max level.
    MaxLevel { key: UpgradeKey, max_level: u32 },
    /// Weapon or category is already owned.
    AlreadyUnlocked,
    /// Weapon index is not in the weapon table.
    UnknownWeapon { index: usize },
    /// Category id is not in the category table.
    UnknownCategory { id: String },
    /// Weapon exists but has not been bought yet.
    WeaponLocked { index: usize },
    /// Every category is already unlocked.
    NothingLocked,
}

impl fmt::Display for ShopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShopError::InsufficientPoints { cost, available } => {
                write!(f, "need {} points, have {}", cost, available)
            }
            ShopError::MaxLevel { key, max_level } => {
                write!(f, "{} is already at max level {}", key.as_str(), max_level)
            }
            ShopError::AlreadyUnlocked => write!(f, "already unlocked"),
            ShopError::UnknownWeapon { index } => write!(f, "no weapon at index {}", index),
            ShopError::UnknownCategory { id } => write!(f, "no category '{}'", id),
            ShopError::WeaponLocked { index } => write!(f, "weapon {} is still locked", index),
            ShopError::NothingLocked => write!(f, "all categories are unlocked"),
        }
    }
}

impl std::error::Error for ShopError {}

/// Storage backend failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend is not reachable (no window, storage disabled, quota).
    Unavailable(String),
    /// Stored payload could not be encoded or decoded.
    Corrupt(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "corrupt save data: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Corrupt(err.to_string())
    }
}

/// Asset provider failure for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
    /// Request or transport failed.
    Fetch { category: String, reason: String },
    /// Manifest was fetched but could not be parsed.
    Manifest { category: String, reason: String },
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Fetch { category, reason } => {
                write!(f, "loading '{}' failed: {}", category, reason)
            }
            AssetError::Manifest { category, reason } => {
                write!(f, "bad manifest for '{}': {}", category, reason)
            }
        }
    }
}

impl std::error::Error for AssetError {}
