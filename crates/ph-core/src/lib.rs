//! Shared identifiers, error categories, and environment configuration.
//!
//! This crate has no game logic of its own; it is the common vocabulary
//! that `ph-cards`, `ph-engine`, `ph-auth`, `ph-database`, `ph-session`,
//! and `ph-server` all build on.

pub mod env;

use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

// ============================================================================
// TYPE ALIASES
// ============================================================================
/// Chip amounts, always in whole units of the table's currency.
pub type Chips = i64;
/// Seat index around a table, 0-based.
pub type Seat = usize;
/// Monotonically increasing hand counter for a table.
pub type HandNumber = u64;

// ============================================================================
// IDENTITY
// ============================================================================
/// Generic ID wrapper providing compile-time type safety over `uuid::Uuid`.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Cast `ID<T>` to `ID<U>` while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}
impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T> Hash for ID<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}
impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}
impl<T> serde::Serialize for ID<T> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.inner.serialize(s)
    }
}
impl<'de, T> serde::Deserialize<'de> for ID<T> {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        uuid::Uuid::deserialize(d).map(Self::from)
    }
}

/// Marker types used only to parameterize [`ID`].
pub mod marker {
    pub struct User;
    pub struct Table;
    pub struct Club;
    pub struct Session;
    pub struct Report;
}

// ============================================================================
// ERRORS
// ============================================================================
/// Categorized error for anything that can surface across an API boundary.
///
/// Each variant maps to one HTTP status family in `ph-server`; truly
/// unrecoverable failures (poisoned locks, serialization bugs, a database
/// gone away mid-transaction) are left to `anyhow` instead of being forced
/// into one of these buckets.
#[derive(Debug, Clone)]
pub enum Error {
    NotFound(String),
    Forbidden(String),
    Conflict(String),
    InvalidArgument(String),
    IllegalState(String),
}

impl Error {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }
    pub fn illegal(msg: impl Into<String>) -> Self {
        Self::IllegalState(msg.into())
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(s) => write!(f, "not found: {s}"),
            Self::Forbidden(s) => write!(f, "forbidden: {s}"),
            Self::Conflict(s) => write!(f, "conflict: {s}"),
            Self::InvalidArgument(s) => write!(f, "invalid argument: {s}"),
            Self::IllegalState(s) => write!(f, "illegal state: {s}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_cast_preserves_uuid() {
        let id = ID::<marker::User>::default();
        let raw: uuid::Uuid = id.inner();
        let cast: ID<marker::Table> = id.cast();
        assert_eq!(cast.inner(), raw);
    }

    #[test]
    fn error_display_includes_category() {
        let e = Error::not_found("table abc");
        assert!(e.to_string().starts_with("not found"));
    }
}
