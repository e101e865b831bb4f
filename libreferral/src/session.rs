//! Bearer token storage and the session context
//!
//! The session is the only persisted client state: a single opaque bearer
//! token. This module provides a trait-based abstraction over where that
//! token lives, and a `Session` handle that is passed explicitly to the API
//! client and services.
//!
//! # Architecture
//!
//! - `TokenStore` trait: get/set/clear of the single `token` key
//! - `KeyringTokenStore`: OS-native secure storage (primary)
//! - `FileTokenStore`: owner-only file in the data directory (fallback)
//! - `MemoryTokenStore`: process-local storage for tests and ephemeral runs
//! - `Session`: cloneable handle with explicit `begin` (login) and `end` (logout)
//!
//! # Example
//!
//! ```no_run
//! use libreferral::session::Session;
//!
//! # fn example() -> libreferral::Result<()> {
//! let session = Session::in_memory();
//! assert!(!session.is_authenticated()?);
//!
//! session.begin("eyJhbGciOi...")?;
//! assert!(session.is_authenticated()?);
//!
//! session.end()?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::claims::{self, Claims};
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};


/// Keyring service name
pub const SERVICE_NAME: &str = "referral";

/// Storage key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Trait for token storage backends
///
/// Every backend holds at most one value under [`TOKEN_KEY`].
pub trait TokenStore: Send + Sync {
    /// Read the stored token, `None` when no token is stored
    fn get(&self) -> Result<Option<String>>;

    /// Store a token, replacing any previous one
    fn set(&self, token: &str) -> Result<()>;

    /// Remove the token
    ///
    /// Clearing an absent token is not an error.
    fn clear(&self) -> Result<()>;

    /// Backend identifier used in logs (e.g. "keyring", "file", "memory")
    fn backend_name(&self) -> &str;
}

/// Storage backend type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS-native keyring (macOS Keychain, Windows Credential Manager, Linux Secret Service)
    #[default]
    Keyring,
    /// Plain file with owner-only permissions
    File,
    /// Forgotten when the process exits
    Memory,
}

/// OS-native keyring storage backend
///
/// The keyring may not be available in all environments (headless Linux
/// without Secret Service, containers without D-Bus). Creating an entry
/// never touches the platform store, so construction reads the entry once
/// and fails with `SessionError::KeyringUnavailable` when the store cannot
/// be reached.
pub struct KeyringTokenStore {
    entry: keyring::Entry,
}

impl KeyringTokenStore {
    pub fn new() -> Result<Self> {
        let entry = keyring::Entry::new(SERVICE_NAME, TOKEN_KEY).map_err(|e| {
            SessionError::KeyringUnavailable(format!("OS keyring not accessible: {}", e))
        })?;
        check_keyring_read(entry.get_password())?;
        Ok(Self { entry })
    }
}

/// Classify the result of a keyring read
///
/// A stored value or a missing entry both mean the platform store answered.
/// Anything else (no D-Bus, locked or absent Secret Service) means it did not.
pub(crate) fn check_keyring_read(result: keyring::Result<String>) -> Result<()> {
    match result {
        Ok(_) | Err(keyring::Error::NoEntry) | Err(keyring::Error::BadEncoding(_)) => Ok(()),
        Err(e) => Err(SessionError::KeyringUnavailable(format!(
            "OS keyring not accessible: {}",
            e
        ))
        .into()),
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SessionError::Keyring(e.to_string()).into()),
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        self.entry
            .set_password(token)
            .map_err(|e| SessionError::Keyring(e.to_string()))?;
        tracing::debug!("Stored session token in OS keyring");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry.delete_password() {
            Ok(_) => {
                tracing::debug!("Deleted session token from OS keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(SessionError::Keyring(e.to_string()).into()),
        }
    }

    fn backend_name(&self) -> &str {
        "keyring"
    }
}

/// Refuse to read or write through a symlink
pub fn validate_not_symlink(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(metadata) if metadata.file_type().is_symlink() => Err(SessionError::Io(format!(
            "Refusing to use symlinked token file: {}",
            path.display()
        ))
        .into()),
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SessionError::Io(e.to_string()).into()),
    }
}

/// File-backed token store
///
/// The token is written to `<dir>/token` with mode 0600 on Unix.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(TOKEN_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_token(&self, token: &str) -> std::io::Result<()> {
        use std::io::Write;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.path)?;
        file.write_all(token.as_bytes())?;
        file.sync_all()
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>> {
        validate_not_symlink(&self.path)?;
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let token = content.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_string()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SessionError::Io(e.to_string()).into()),
        }
    }

    fn set(&self, token: &str) -> Result<()> {
        validate_not_symlink(&self.path)?;
        self.write_token(token)
            .map_err(|e| SessionError::Io(e.to_string()))?;
        tracing::debug!("Stored session token in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Io(e.to_string()).into()),
        }
    }

    fn backend_name(&self) -> &str {
        "file"
    }
}

/// In-process token store
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>> {
        let token = self
            .token
            .read()
            .map_err(|_| SessionError::Io("token lock poisoned".to_string()))?;
        Ok(token.clone())
    }

    fn set(&self, token: &str) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| SessionError::Io("token lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| SessionError::Io("token lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

/// Build the token store selected by configuration
///
/// A configured keyring that cannot be reached falls back to the file store.
pub fn open_store(config: &SessionConfig) -> Result<Arc<dyn TokenStore>> {
    match config.storage {
        StorageBackend::Keyring => match KeyringTokenStore::new() {
            Ok(store) => {
                tracing::info!("Using OS keyring for the session token");
                Ok(Arc::new(store))
            }
            Err(e) => {
                tracing::warn!("{}. Falling back to file storage.", e);
                Ok(Arc::new(FileTokenStore::new(config.expand_path())))
            }
        },
        StorageBackend::File => Ok(Arc::new(FileTokenStore::new(config.expand_path()))),
        StorageBackend::Memory => Ok(Arc::new(MemoryTokenStore::new())),
    }
}

/// Process-wide session context
///
/// Cloning is cheap; all clones share the same store.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("backend", &self.store.backend_name())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        Ok(Self::new(open_store(config)?))
    }

    /// Current bearer token, if any
    ///
    /// No expiry check happens here; an expired token is only detected when
    /// the backend rejects a request.
    pub fn token(&self) -> Result<Option<String>> {
        self.store.get()
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.token()?.is_some())
    }

    /// Start a session after a successful login
    pub fn begin(&self, token: &str) -> Result<()> {
        self.store.set(token)?;
        tracing::info!(backend = self.store.backend_name(), "Session started");
        Ok(())
    }

    /// End the session (logout)
    pub fn end(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!(backend = self.store.backend_name(), "Session ended");
        Ok(())
    }

    /// Claims decoded from the stored token
    pub fn claims(&self) -> Result<Option<Claims>> {
        match self.token()? {
            Some(token) => Ok(Some(claims::decode(&token)?)),
            None => Ok(None),
        }
    }

    /// Username claim of the stored token
    pub fn username(&self) -> Result<Option<String>> {
        Ok(self.claims()?.and_then(|claims| claims.username))
    }

    pub fn backend_name(&self) -> &str {
        self.store.backend_name()
    }
}
