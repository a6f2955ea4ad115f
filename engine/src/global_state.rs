//! Global state.

/// In-memory implementation of global state.
pub mod in_memory;

use thiserror::Error;

use multi_staking_types::{bytesrepr, Key, StoredValue};

/// A trait expressing the reading of state. This trait is used to abstract the underlying store.
pub trait StateReader<K, V> {
    /// An error which occurs when reading state
    type Error;

    /// Returns the state value from the corresponding key
    fn read(&self, key: &K) -> Result<Option<V>, Self::Error>;

    /// Returns the keys in the store matching `prefix`.
    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<K>, Self::Error>;
}

impl<K, V, R: StateReader<K, V> + ?Sized> StateReader<K, V> for &R {
    type Error = R::Error;

    fn read(&self, key: &K) -> Result<Option<V>, Self::Error> {
        (**self).read(key)
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<K>, Self::Error> {
        (**self).keys_with_prefix(prefix)
    }
}

/// Provides `commit` method.
pub trait CommitProvider: StateReader<Key, StoredValue, Error = Error> {
    /// Applies `effects` in order, all or nothing.
    fn commit(&self, effects: Effects) -> Result<(), Error>;
}

/// Errors raised by global state.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("global state lock poisoned")]
    Poisoned,
    /// A key or value failed to (de)serialize.
    #[error("serialization error: {0}")]
    BytesRepr(bytesrepr::Error),
}

impl From<bytesrepr::Error> for Error {
    fn from(error: bytesrepr::Error) -> Self {
        Error::BytesRepr(error)
    }
}

/// The kind of change a [`Transform`] applies.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformKind {
    /// Store the value.
    Write(StoredValue),
    /// Remove the value.
    Prune,
}

/// A change to a single key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transform {
    key: Key,
    kind: TransformKind,
}

impl Transform {
    /// Constructs a new `Transform`.
    pub fn new(key: Key, kind: TransformKind) -> Self {
        Transform { key, kind }
    }

    /// The key being changed.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The change.
    pub fn kind(&self) -> &TransformKind {
        &self.kind
    }

    /// Consumes `self`, returning its constituent parts.
    pub fn destructure(self) -> (Key, TransformKind) {
        (self.key, self.kind)
    }
}

/// An ordered collection of [`Transform`]s staged by a single request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Effects(Vec<Transform>);

impl Effects {
    /// Constructs a new, empty `Effects`.
    pub const fn new() -> Self {
        Effects(vec![])
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.0.push(transform)
    }

    /// Returns `true` if nothing was staged.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of staged transforms.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns an iterator over the transforms.
    pub fn transforms(&self) -> impl Iterator<Item = &Transform> {
        self.0.iter()
    }
}

impl IntoIterator for Effects {
    type Item = Transform;
    type IntoIter = std::vec::IntoIter<Transform>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
