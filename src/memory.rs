//! In-memory registry store.
//!
//! [`MemoryStore`] backs the command line tool and the test-suite. Keys and
//! value names compare case-insensitively, like the native registry, and
//! keep the spelling they were first created with. Every call made by the
//! importer is appended to an operation log.

use crate::error::StoreError;
use crate::store::{RegistryStore, RootKey};
use crate::value::{ValueData, ValueType};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// A store call, as recorded in the operation log.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum StoreOp {
    /// A key was opened (and created if missing).
    OpenKey {
        /// Canonical key path.
        path: String,
    },
    /// A key handle was closed.
    CloseKey {
        /// Canonical key path.
        path: String,
    },
    /// A value was written.
    SetValue {
        /// Canonical key path.
        path: String,
        /// Value name, `None` for the default value.
        name: Option<String>,
        /// Declared type.
        value_type: ValueType,
        /// Raw data.
        data: Vec<u8>,
    },
}

/// A value held by a [`StoredKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StoredValue {
    /// Value name, `None` for the default value.
    pub name: Option<String>,
    /// Declared type.
    pub value_type: ValueType,
    /// Raw data.
    pub data: Vec<u8>,
}

impl StoredValue {
    /// Typed view of the data.
    pub fn data(&self) -> ValueData {
        ValueData::parse(&self.data, self.value_type)
    }

    fn matches(&self, name: Option<&str>) -> bool {
        match (self.name.as_deref(), name) {
            (None, None) => true,
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

/// A key held by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StoredKey {
    /// Canonical path, starting with the full root key name.
    pub path: String,
    /// Values in the order they were first written.
    pub values: Vec<StoredValue>,
}

impl StoredKey {
    /// Looks a value up by name; `None` selects the default value.
    pub fn value(&self, name: Option<&str>) -> Option<&StoredValue> {
        self.values.iter().find(|v| v.matches(name))
    }
}

/// Handle to a key opened in a [`MemoryStore`].
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryKey {
    id: u64,
    slot: String,
    path: String,
}

impl MemoryKey {
    /// Canonical path of the key.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Registry store kept entirely in memory.
#[derive(Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MemoryStore {
    keys: BTreeMap<String, StoredKey>,
    #[cfg_attr(feature = "serde", serde(skip))]
    open: HashSet<u64>,
    #[cfg_attr(feature = "serde", serde(skip))]
    next_handle: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    operations: Vec<StoreOp>,
    #[cfg_attr(feature = "serde", serde(skip))]
    read_only: Vec<String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes opening `path`, or any key below it, fail.
    pub fn deny(&mut self, path: &str) {
        if let Some((root, sub)) = RootKey::split_path(path) {
            self.read_only.push(slot_name(&canonical_path(root, sub)));
        }
    }

    /// Looks a key up by path. Abbreviated root names are accepted.
    pub fn key(&self, path: &str) -> Option<&StoredKey> {
        let (root, sub) = RootKey::split_path(path)?;
        self.keys.get(&slot_name(&canonical_path(root, sub)))
    }

    /// Looks a value up by key path and name.
    pub fn value(&self, path: &str, name: Option<&str>) -> Option<&StoredValue> {
        self.key(path)?.value(name)
    }

    /// All keys, ordered by path.
    pub fn keys(&self) -> impl Iterator<Item = &StoredKey> {
        self.keys.values()
    }

    /// Total number of values over all keys.
    pub fn value_count(&self) -> usize {
        self.keys.values().map(|k| k.values.len()).sum()
    }

    /// The operation log.
    pub fn operations(&self) -> &[StoreOp] {
        &self.operations
    }

    /// Number of handles currently open.
    pub fn open_handles(&self) -> usize {
        self.open.len()
    }

    /// Serializes the keys and values as pretty-printed JSON.
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.keys.values().collect::<Vec<_>>())
    }

    fn is_denied(&self, slot: &str) -> bool {
        self.read_only.iter().any(|denied| {
            slot == denied
                || (slot.starts_with(denied.as_str()) && slot[denied.len()..].starts_with('\\'))
        })
    }

    fn ensure_key(&mut self, path: &str) {
        self.keys
            .entry(slot_name(path))
            .or_insert_with(|| StoredKey {
                path: path.to_string(),
                values: Vec::new(),
            });
    }
}

impl RegistryStore for MemoryStore {
    type Key = MemoryKey;

    fn open_or_create_key(&mut self, root: RootKey, path: &str) -> Result<MemoryKey, StoreError> {
        let full = canonical_path(root, path);
        let slot = slot_name(&full);
        if self.is_denied(&slot) {
            return Err(StoreError::Backend(format!("access denied: {}", full)));
        }

        // Create every missing ancestor, like the native call does.
        let mut prefix = root.name().to_string();
        self.ensure_key(&prefix);
        for component in path.split('\\').filter(|c| !c.is_empty()) {
            prefix.push('\\');
            prefix.push_str(component);
            self.ensure_key(&prefix);
        }

        let id = self.next_handle;
        self.next_handle += 1;
        self.open.insert(id);
        self.operations.push(StoreOp::OpenKey { path: full.clone() });
        debug!(path = %full, handle = id, "Opened key");

        Ok(MemoryKey {
            id,
            slot,
            path: full,
        })
    }

    fn close_key(&mut self, key: MemoryKey) {
        if self.open.remove(&key.id) {
            self.operations.push(StoreOp::CloseKey { path: key.path });
        }
    }

    fn set_value(
        &mut self,
        key: &MemoryKey,
        name: Option<&str>,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), StoreError> {
        if !self.open.contains(&key.id) {
            return Err(StoreError::KeyNotOpen);
        }
        let stored = self.keys.get_mut(&key.slot).ok_or(StoreError::KeyNotOpen)?;

        let value = StoredValue {
            name: name.map(str::to_string),
            value_type,
            data: data.to_vec(),
        };
        match stored.values.iter_mut().find(|v| v.matches(name)) {
            Some(existing) => {
                existing.value_type = value.value_type;
                existing.data = value.data.clone();
            }
            None => stored.values.push(value.clone()),
        }

        self.operations.push(StoreOp::SetValue {
            path: key.path.clone(),
            name: value.name,
            value_type,
            data: value.data,
        });
        Ok(())
    }
}

/// Full root name plus the sub path, without empty components.
fn canonical_path(root: RootKey, path: &str) -> String {
    let mut full = root.name().to_string();
    for component in path.split('\\').filter(|c| !c.is_empty()) {
        full.push('\\');
        full.push_str(component);
    }
    full
}

fn slot_name(path: &str) -> String {
    path.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::encode_reg_sz;

    #[test]
    fn test_open_creates_ancestors() {
        let mut store = MemoryStore::new();
        let key = store
            .open_or_create_key(RootKey::CurrentUser, "Software\\Foo")
            .unwrap();
        assert_eq!(key.path(), "HKEY_CURRENT_USER\\Software\\Foo");
        store.close_key(key);

        assert!(store.key("HKEY_CURRENT_USER").is_some());
        assert!(store.key("HKCU\\software").is_some());
        assert!(store.key("hkey_current_user\\SOFTWARE\\foo").is_some());
        assert_eq!(store.open_handles(), 0);
    }

    #[test]
    fn test_set_value_replaces_case_insensitively() {
        let mut store = MemoryStore::new();
        let key = store.open_or_create_key(RootKey::LocalMachine, "A").unwrap();
        store
            .set_value(&key, Some("Name"), ValueType::String, &encode_reg_sz("one"))
            .unwrap();
        store
            .set_value(&key, Some("NAME"), ValueType::Dword, &7u32.to_le_bytes())
            .unwrap();
        store
            .set_value(&key, None, ValueType::String, &encode_reg_sz("default"))
            .unwrap();
        store.close_key(key);

        let stored = store.key("HKLM\\A").unwrap();
        assert_eq!(stored.values.len(), 2);
        let named = stored.value(Some("name")).unwrap();
        assert_eq!(named.name.as_deref(), Some("Name"));
        assert_eq!(named.data(), ValueData::Dword(7));
        assert_eq!(
            store.value("HKLM\\A", None).unwrap().data(),
            ValueData::String("default".to_string())
        );
        assert_eq!(store.value_count(), 2);
    }

    #[test]
    fn test_closed_handle_rejects_writes() {
        let mut store = MemoryStore::new();
        let key = store.open_or_create_key(RootKey::Users, "x").unwrap();
        let stale = MemoryKey {
            id: key.id,
            slot: key.slot.clone(),
            path: key.path.clone(),
        };
        store.close_key(key);
        assert_eq!(
            store.set_value(&stale, None, ValueType::Binary, &[]),
            Err(StoreError::KeyNotOpen)
        );
    }

    #[test]
    fn test_denied_paths() {
        let mut store = MemoryStore::new();
        store.deny("HKLM\\Locked");
        assert!(store.open_or_create_key(RootKey::LocalMachine, "Locked").is_err());
        assert!(store.open_or_create_key(RootKey::LocalMachine, "locked\\Sub").is_err());
        assert!(store.open_or_create_key(RootKey::LocalMachine, "LockedOut").is_ok());
    }

    #[test]
    fn test_operation_log() {
        let mut store = MemoryStore::new();
        let key = store.open_or_create_key(RootKey::ClassesRoot, ".foo").unwrap();
        store
            .set_value(&key, None, ValueType::String, &encode_reg_sz("bar"))
            .unwrap();
        store.close_key(key);

        let ops = store.operations();
        assert_eq!(ops.len(), 3);
        assert_eq!(
            ops[0],
            StoreOp::OpenKey {
                path: "HKEY_CLASSES_ROOT\\.foo".to_string()
            }
        );
        assert!(matches!(ops[1], StoreOp::SetValue { ref name, .. } if name.is_none()));
        assert!(matches!(ops[2], StoreOp::CloseKey { .. }));
    }
}
