//! Outcome types for cache-aside operations
//!
//! The primary value always comes from the store or a cache hit. Cache
//! writes and deletes ride alongside as [`SideEffect`]s: they are reported,
//! never allowed to change the primary result.

use std::fmt;

use crate::cache::{CacheKey, CacheUnavailable};

/// What the read path found in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Served from cache; the store was not consulted
    Hit,
    /// No entry; served from the store
    Miss,
    /// Lookup failed or the entry was unreadable; served from the store
    Error,
}

impl fmt::Display for CacheLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheLookup::Hit => write!(f, "HIT"),
            CacheLookup::Miss => write!(f, "MISS"),
            CacheLookup::Error => write!(f, "ERROR"),
        }
    }
}

/// A best-effort cache write made on behalf of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideEffect {
    Populated(CacheKey),
    PopulateFailed(CacheKey, CacheUnavailable),
    Invalidated(CacheKey),
    /// The key may keep serving pre-write data until its TTL runs out
    InvalidateFailed(CacheKey, CacheUnavailable),
}

impl SideEffect {
    pub fn key(&self) -> &CacheKey {
        match self {
            SideEffect::Populated(key)
            | SideEffect::PopulateFailed(key, _)
            | SideEffect::Invalidated(key)
            | SideEffect::InvalidateFailed(key, _) => key,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            SideEffect::PopulateFailed(..) | SideEffect::InvalidateFailed(..)
        )
    }
}

/// The result of a coordinated operation.
#[derive(Debug, Clone)]
pub struct Served<T> {
    pub value: T,
    /// `None` for writes, which never read the cache
    pub lookup: Option<CacheLookup>,
    pub effects: Vec<SideEffect>,
}

impl<T> Served<T> {
    pub fn read(value: T, lookup: CacheLookup, effects: Vec<SideEffect>) -> Self {
        Self {
            value,
            lookup: Some(lookup),
            effects,
        }
    }

    pub fn write(value: T, effects: Vec<SideEffect>) -> Self {
        Self {
            value,
            lookup: None,
            effects,
        }
    }

    /// True when every side effect went through.
    pub fn is_clean(&self) -> bool {
        !self.effects.iter().any(SideEffect::is_failure)
    }

    /// Keys whose side effect failed.
    pub fn failed_keys(&self) -> Vec<CacheKey> {
        self.effects
            .iter()
            .filter(|effect| effect.is_failure())
            .map(|effect| *effect.key())
            .collect()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}
