//! Key-value stores backing the shopper session.

use std::{
    collections::BTreeMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::session::SessionError;

/// Keys persisted across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// Signed-in user profile, as JSON.
    CurrentUser,

    /// Bearer token.
    AuthToken,

    /// Anonymous shopper id.
    GuestId,

    /// Order awaiting a bank-transfer return, as JSON.
    PendingOrder,

    /// Last validated shipping address, as JSON.
    ShippingAddress,

    /// Order awaiting a wallet return.
    CurrentOrderCode,
}

impl SessionKey {
    /// Storage name of the key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrentUser => "current_user",
            Self::AuthToken => "auth_token",
            Self::GuestId => "guest_id",
            Self::PendingOrder => "pending_order",
            Self::ShippingAddress => "shipping_address",
            Self::CurrentOrderCode => "current_order_code",
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backing storage for [`Session`](crate::session::Session) values.
pub trait SessionStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: SessionKey, value: String) -> Result<(), SessionError>;

    /// Delete a value. Deleting a missing key is not an error.
    fn remove(&self, key: SessionKey) -> Result<(), SessionError>;
}

/// Process-local session, lost on exit.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        Ok(values.get(key.as_str()).cloned())
    }

    fn set(&self, key: SessionKey, value: String) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        values.insert(key.as_str().to_string(), value);

        Ok(())
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        values.remove(key.as_str());

        Ok(())
    }
}

/// Session persisted as a flat JSON object, rewritten on every change.
#[derive(Debug)]
pub struct FileSessionStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileSessionStore {
    /// Open the session file at `path`, starting empty when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        let path = path.as_ref().to_path_buf();

        let values = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(error) if error.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(error) => return Err(error.into()),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    /// Location of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        fs::write(&self.path, serde_json::to_vec_pretty(values)?)?;

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: SessionKey) -> Result<Option<String>, SessionError> {
        let values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        Ok(values.get(key.as_str()).cloned())
    }

    fn set(&self, key: SessionKey, value: String) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        values.insert(key.as_str().to_string(), value);

        self.persist(&values)
    }

    fn remove(&self, key: SessionKey) -> Result<(), SessionError> {
        let mut values = self.values.lock().map_err(|_poisoned| SessionError::Poisoned)?;

        if values.remove(key.as_str()).is_none() {
            return Ok(());
        }

        self.persist(&values)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn memory_store_round_trips_values() -> TestResult {
        let store = MemorySessionStore::new();

        store.set(SessionKey::GuestId, "g-1".to_string())?;
        assert_eq!(store.get(SessionKey::GuestId)?.as_deref(), Some("g-1"));

        store.remove(SessionKey::GuestId)?;
        assert_eq!(store.get(SessionKey::GuestId)?, None);

        Ok(())
    }

    #[test]
    fn file_store_survives_reopen() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("session.json");

        {
            let store = FileSessionStore::open(&path)?;
            store.set(SessionKey::AuthToken, "secret".to_string())?;
            store.set(SessionKey::CurrentOrderCode, "ORD-1".to_string())?;
            store.remove(SessionKey::CurrentOrderCode)?;
        }

        let reopened = FileSessionStore::open(&path)?;

        assert_eq!(reopened.get(SessionKey::AuthToken)?.as_deref(), Some("secret"));
        assert_eq!(reopened.get(SessionKey::CurrentOrderCode)?, None);

        Ok(())
    }

    #[test]
    fn missing_file_opens_empty() -> TestResult {
        let dir = tempfile::tempdir()?;
        let store = FileSessionStore::open(dir.path().join("absent.json"))?;

        assert_eq!(store.get(SessionKey::GuestId)?, None);

        Ok(())
    }

    #[test]
    fn corrupt_file_is_reported() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("session.json");
        fs::write(&path, "not json")?;

        let result = FileSessionStore::open(&path);

        assert!(
            matches!(result, Err(SessionError::Serde(_))),
            "expected Serde, got {result:?}"
        );

        Ok(())
    }
}
