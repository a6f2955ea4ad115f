use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use multi_staking_types::{bytesrepr::ToBytes, Key, StoredValue};

use super::{CommitProvider, Effects, Error, StateReader, TransformKind};

/// Global state implemented purely in memory only. No state is saved to disk.
///
/// Clones share the same underlying store.
#[derive(Clone, Debug, Default)]
pub struct InMemoryGlobalState {
    store: Arc<RwLock<BTreeMap<Key, StoredValue>>>,
}

impl InMemoryGlobalState {
    /// Creates an empty state.
    pub fn empty() -> Self {
        InMemoryGlobalState::default()
    }

    /// Creates a state from a given set of `Key, StoredValue` pairs.
    pub fn from_pairs(pairs: &[(Key, StoredValue)]) -> Self {
        let store = pairs.iter().cloned().collect();
        InMemoryGlobalState {
            store: Arc::new(RwLock::new(store)),
        }
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.store.read().map_err(|_| Error::Poisoned)?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

impl StateReader<Key, StoredValue> for InMemoryGlobalState {
    type Error = Error;

    fn read(&self, key: &Key) -> Result<Option<StoredValue>, Self::Error> {
        let store = self.store.read().map_err(|_| Error::Poisoned)?;
        Ok(store.get(key).cloned())
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Key>, Self::Error> {
        let store = self.store.read().map_err(|_| Error::Poisoned)?;
        let mut keys = Vec::new();
        for key in store.keys() {
            if key.to_bytes()?.starts_with(prefix) {
                keys.push(key.clone());
            }
        }
        Ok(keys)
    }
}

impl CommitProvider for InMemoryGlobalState {
    fn commit(&self, effects: Effects) -> Result<(), Error> {
        let mut store = self.store.write().map_err(|_| Error::Poisoned)?;
        let count = effects.len();
        for transform in effects {
            match transform.destructure() {
                (key, TransformKind::Write(value)) => {
                    store.insert(key, value);
                }
                (key, TransformKind::Prune) => {
                    store.remove(&key);
                }
            }
        }
        debug!(count, "committed transforms");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use multi_staking_types::{KeyTag, ValidatorAddr};

    use super::*;
    use crate::global_state::Transform;

    fn denom_key(byte: u8) -> Key {
        Key::ValidatorDenom(ValidatorAddr::new([byte; 32]))
    }

    #[test]
    fn should_commit_writes_and_prunes_in_order() {
        let state = InMemoryGlobalState::from_pairs(&[(
            denom_key(1),
            StoredValue::Denom("stake-a".to_string()),
        )]);

        let mut effects = Effects::new();
        effects.push(Transform::new(
            denom_key(2),
            TransformKind::Write(StoredValue::Denom("stake-b".to_string())),
        ));
        effects.push(Transform::new(denom_key(1), TransformKind::Prune));
        effects.push(Transform::new(
            denom_key(2),
            TransformKind::Write(StoredValue::Denom("stake-c".to_string())),
        ));
        state.commit(effects).unwrap();

        assert_eq!(state.read(&denom_key(1)).unwrap(), None);
        assert_eq!(
            state.read(&denom_key(2)).unwrap(),
            Some(StoredValue::Denom("stake-c".to_string()))
        );
        assert_eq!(state.len().unwrap(), 1);
    }

    #[test]
    fn should_filter_keys_by_prefix() {
        let state = InMemoryGlobalState::from_pairs(&[
            (denom_key(1), StoredValue::Denom("stake-a".to_string())),
            (
                Key::BondWeight("stake-a".to_string()),
                StoredValue::Denom("unused".to_string()),
            ),
        ]);
        let keys = state
            .keys_with_prefix(&KeyTag::ValidatorDenom.prefix())
            .unwrap();
        assert_eq!(keys, vec![denom_key(1)]);
        assert!(state.keys_with_prefix(&KeyTag::Lock.prefix()).unwrap().is_empty());
    }
}
