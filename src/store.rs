//! The key/value store an import is replayed against.
//!
//! The parser never persists anything itself. It resolves the root of each
//! key path, asks the store to open or create the key, writes values
//! through the returned handle and closes the handle before opening the
//! next key.

use crate::error::StoreError;
use crate::value::ValueType;
use std::fmt;

/// Predefined top-level keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum RootKey {
    /// `HKEY_CLASSES_ROOT` (`HKCR`).
    ClassesRoot,
    /// `HKEY_CURRENT_USER` (`HKCU`).
    CurrentUser,
    /// `HKEY_LOCAL_MACHINE` (`HKLM`).
    LocalMachine,
    /// `HKEY_USERS` (`HKU`).
    Users,
    /// `HKEY_CURRENT_CONFIG` (`HKCC`).
    CurrentConfig,
}

impl RootKey {
    /// All root keys.
    pub const ALL: [RootKey; 5] = [
        RootKey::ClassesRoot,
        RootKey::CurrentUser,
        RootKey::LocalMachine,
        RootKey::Users,
        RootKey::CurrentConfig,
    ];

    /// Full name, e.g. `HKEY_LOCAL_MACHINE`.
    pub fn name(&self) -> &'static str {
        match self {
            RootKey::ClassesRoot => "HKEY_CLASSES_ROOT",
            RootKey::CurrentUser => "HKEY_CURRENT_USER",
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE",
            RootKey::Users => "HKEY_USERS",
            RootKey::CurrentConfig => "HKEY_CURRENT_CONFIG",
        }
    }

    /// Abbreviated name, e.g. `HKLM`.
    pub fn short_name(&self) -> &'static str {
        match self {
            RootKey::ClassesRoot => "HKCR",
            RootKey::CurrentUser => "HKCU",
            RootKey::LocalMachine => "HKLM",
            RootKey::Users => "HKU",
            RootKey::CurrentConfig => "HKCC",
        }
    }

    /// Splits a key path into its root key and the path below it.
    ///
    /// The root token is matched case-insensitively against the full and the
    /// abbreviated names and must be followed by `\` or the end of the path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use reg_import::RootKey;
    ///
    /// assert_eq!(
    ///     RootKey::split_path("HKEY_CURRENT_USER\\Software\\Foo"),
    ///     Some((RootKey::CurrentUser, "Software\\Foo"))
    /// );
    /// assert_eq!(RootKey::split_path("hklm"), Some((RootKey::LocalMachine, "")));
    /// assert_eq!(RootKey::split_path("HKEY_CURRENT_USERS\\Foo"), None);
    /// ```
    pub fn split_path(path: &str) -> Option<(RootKey, &str)> {
        let (token, rest) = match path.split_once('\\') {
            Some((token, rest)) => (token, rest),
            None => (path, ""),
        };

        Self::ALL.into_iter().find_map(|root| {
            let matches = token.eq_ignore_ascii_case(root.name())
                || token.eq_ignore_ascii_case(root.short_name());
            matches.then_some((root, rest))
        })
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hierarchical key/value store consumed by the importer.
///
/// All calls are synchronous and fallible; the importer reports failures
/// and never retries them.
pub trait RegistryStore {
    /// Handle to an open key.
    type Key;

    /// Maps the leading component of `path` to a root key and returns the
    /// remaining path.
    fn resolve_root<'a>(&self, path: &'a str) -> Option<(RootKey, &'a str)> {
        RootKey::split_path(path)
    }

    /// Opens `path` below `root`, creating missing keys. An empty path opens
    /// the root itself.
    fn open_or_create_key(&mut self, root: RootKey, path: &str) -> Result<Self::Key, StoreError>;

    /// Closes a handle returned by [`open_or_create_key`](Self::open_or_create_key).
    fn close_key(&mut self, key: Self::Key);

    /// Writes a value. `name` is `None` for the key's default value.
    fn set_value(
        &mut self,
        key: &Self::Key,
        name: Option<&str>,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), StoreError>;
}

impl<S: RegistryStore + ?Sized> RegistryStore for &mut S {
    type Key = S::Key;

    fn resolve_root<'a>(&self, path: &'a str) -> Option<(RootKey, &'a str)> {
        (**self).resolve_root(path)
    }

    fn open_or_create_key(&mut self, root: RootKey, path: &str) -> Result<Self::Key, StoreError> {
        (**self).open_or_create_key(root, path)
    }

    fn close_key(&mut self, key: Self::Key) {
        (**self).close_key(key)
    }

    fn set_value(
        &mut self,
        key: &Self::Key,
        name: Option<&str>,
        value_type: ValueType,
        data: &[u8],
    ) -> Result<(), StoreError> {
        (**self).set_value(key, name, value_type, data)
    }
}
