use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use super::error::AuthError;

/// Keys recognized by a credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr)]
pub enum CredentialKey {
    #[strum(serialize = "token")]
    AccessToken,
    #[strum(serialize = "refreshToken")]
    RefreshToken,
    #[strum(serialize = "autoLogin")]
    AutoLogin,
}

impl CredentialKey {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Persisted key/value storage for session credentials.
///
/// Removing an absent key is never an error.
pub trait CredentialStore: Send + Sync {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, AuthError>;
    fn set(&self, key: CredentialKey, value: &str) -> Result<(), AuthError>;
    fn remove(&self, key: CredentialKey) -> Result<(), AuthError>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    values: Mutex<BTreeMap<CredentialKey, String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_values<T>(&self, f: impl FnOnce(&mut BTreeMap<CredentialKey, String>) -> T) -> T {
        let mut guard = self
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, AuthError> {
        Ok(self.with_values(|values| values.get(&key).cloned()))
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), AuthError> {
        self.with_values(|values| values.insert(key, value.to_string()));
        Ok(())
    }

    fn remove(&self, key: CredentialKey) -> Result<(), AuthError> {
        self.with_values(|values| values.remove(&key));
        Ok(())
    }
}

/// File-backed store keeping all keys in one TOML file.
///
/// # Example
/// ```no_run
/// use scholar_client::auth::{CredentialKey, CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new(std::path::PathBuf::from("/tmp/scholar"));
/// store.set(CredentialKey::AutoLogin, "true")?;
/// # Ok::<(), scholar_client::auth::AuthError>(())
/// ```
#[derive(Debug)]
pub struct FileCredentialStore {
    path: PathBuf,
    // Readers share; read-modify-write cycles are exclusive within this process.
    lock: RwLock<()>,
}

impl FileCredentialStore {
    pub const FILE_NAME: &'static str = "credentials.toml";

    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            path: base_dir.join(Self::FILE_NAME),
            lock: RwLock::new(()),
        }
    }

    pub fn new_default() -> Self {
        Self::new(default_credential_dir())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(&self) -> Result<CredentialFile, AuthError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CredentialFile::default())
            }
            Err(err) => return Err(AuthError::Io(err.to_string())),
        };
        Ok(toml::from_str(&raw)?)
    }

    fn write_file(&self, mut file: CredentialFile) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        file.version = 1;
        file.saved_at = Some(Utc::now());
        let serialized = toml::to_string(&file)?;
        atomic_write(&self.path, serialized.as_bytes())
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>) -> bool) -> Result<(), AuthError> {
        let _guard = self
            .lock
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut file = self.read_file()?;
        if f(&mut file.values) {
            self.write_file(file)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, key: CredentialKey) -> Result<Option<String>, AuthError> {
        let _guard = self
            .lock
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(self.read_file()?.values.get(key.as_str()).cloned())
    }

    fn set(&self, key: CredentialKey, value: &str) -> Result<(), AuthError> {
        self.update(|values| {
            values.insert(key.as_str().to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: CredentialKey) -> Result<(), AuthError> {
        self.update(|values| values.remove(key.as_str()).is_some())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    values: BTreeMap<String, String>,
}

/// Replace `path` with `data` so that readers see either the old or the new
/// file, never a truncated one.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), AuthError> {
    static SEQ: AtomicU32 = AtomicU32::new(0);

    let file_name = path
        .file_name()
        .ok_or_else(|| AuthError::Io(format!("credential path {} has no file name", path.display())))?;
    let temp_path = path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name.to_string_lossy(),
        std::process::id(),
        SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let written = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()
    })();
    if let Err(err) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

pub(crate) fn default_credential_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".scholar"))
        .unwrap_or_else(|| PathBuf::from(".scholar"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(dir.path().to_path_buf());
        (dir, store)
    }

    #[test]
    fn key_names_match_persisted_layout() {
        assert_eq!(CredentialKey::AccessToken.as_str(), "token");
        assert_eq!(CredentialKey::RefreshToken.as_str(), "refreshToken");
        assert_eq!(CredentialKey::AutoLogin.to_string(), "autoLogin");
        assert_eq!(
            "refreshToken".parse::<CredentialKey>().unwrap(),
            CredentialKey::RefreshToken
        );
    }

    #[test]
    fn file_store_persists_values() {
        let (dir, store) = temp_store();
        store.set(CredentialKey::AccessToken, "access").unwrap();
        store.set(CredentialKey::RefreshToken, "refresh").unwrap();

        let reopened = FileCredentialStore::new(dir.path().to_path_buf());
        assert_eq!(
            reopened.get(CredentialKey::AccessToken).unwrap().as_deref(),
            Some("access")
        );
        assert_eq!(
            reopened.get(CredentialKey::RefreshToken).unwrap().as_deref(),
            Some("refresh")
        );
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.get(CredentialKey::AccessToken).unwrap().is_none());
        assert!(!store.path().exists());
    }

    #[test]
    fn file_store_remove_missing_is_noop() {
        let (_dir, store) = temp_store();
        store.remove(CredentialKey::RefreshToken).unwrap();
        assert!(!store.path().exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let (_dir, store) = temp_store();
        store.set(CredentialKey::AccessToken, "access").unwrap();
        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_reads_never_observe_partial_writes() {
        use std::sync::Arc;

        let (_dir, store) = temp_store();
        store.set(CredentialKey::RefreshToken, "refresh").unwrap();
        let store = Arc::new(store);

        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..500 {
                    store
                        .set(CredentialKey::AccessToken, &format!("access-{i}"))
                        .unwrap();
                }
            })
        };
        for _ in 0..2000 {
            assert_eq!(
                store.get(CredentialKey::RefreshToken).unwrap().as_deref(),
                Some("refresh")
            );
        }
        writer.join().unwrap();

        let leftovers: Vec<_> = fs::read_dir(store.path().parent().unwrap())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn memory_store_set_and_remove() {
        let store = MemoryCredentialStore::new();
        store.set(CredentialKey::AutoLogin, "true").unwrap();
        assert_eq!(
            store.get(CredentialKey::AutoLogin).unwrap().as_deref(),
            Some("true")
        );
        store.remove(CredentialKey::AutoLogin).unwrap();
        store.remove(CredentialKey::AutoLogin).unwrap();
        assert!(store.get(CredentialKey::AutoLogin).unwrap().is_none());
    }
}
