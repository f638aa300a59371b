//! Where the gate reads the configured bridge address from.
//!
//! The host owns the settings store; the gate only needs the current value
//! of one key. A missing value reads as the empty string, which the gate
//! reports as [`ErrorKind::MissingIdentifier`](crate::config::ErrorKind).
//!
//! [`FileSettings`] keeps the value in a small JSON document, by default
//! `~/.bridge-link-gate/settings.json`:
//!
//! ```json
//! { "rileylink_address": "00:11:22:aa:bb:cc" }
//! ```
//!
//! Unknown keys in that document are preserved when the address is saved.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// JSON key holding the bridge address.
pub const BRIDGE_ADDRESS_KEY: &str = "rileylink_address";

/// Read access to the configured bridge address.
pub trait SettingsSource {
    /// The configured address, or an empty string if none is set.
    fn bridge_address(&self) -> String;
}

/// In-memory settings, for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySettings {
    address: Mutex<String>,
}

impl MemorySettings {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: Mutex::new(address.into()),
        }
    }

    /// Replace the stored address.
    pub fn set(&self, address: impl Into<String>) {
        let mut guard = self.address.lock().unwrap_or_else(|e| e.into_inner());
        *guard = address.into();
    }
}

impl SettingsSource for MemorySettings {
    fn bridge_address(&self) -> String {
        self.address
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

/// On-disk layout of the settings document.
#[derive(Debug, Default, Serialize, Deserialize)]
struct SettingsDocument {
    #[serde(default)]
    rileylink_address: String,
    #[serde(flatten)]
    other: serde_json::Map<String, serde_json::Value>,
}

/// Settings stored in a JSON file.
///
/// The file is re-read on every access so edits made while the host runs
/// are picked up by the next verification pass.
#[derive(Debug, Clone)]
pub struct FileSettings {
    path: PathBuf,
}

impl FileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings at [`default_settings_path`].
    pub fn open_default() -> io::Result<Self> {
        Ok(Self::new(default_settings_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the settings document.
    ///
    /// A missing file is `Ok(None)`. Unreadable or corrupt files are errors.
    fn load_document(&self) -> io::Result<Option<SettingsDocument>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file found at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Store a bridge address, keeping any other keys in the file.
    ///
    /// The value is stored as given; validation is the gate's job. Refuses
    /// to overwrite a file that exists but cannot be read or parsed.
    pub fn save_bridge_address(&self, address: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut doc = self.load_document()?.unwrap_or_default();
        doc.rileylink_address = address.to_string();
        let json = serde_json::to_string_pretty(&doc)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, &json)?;

        // Verify write by reading back
        let read_back = fs::read_to_string(&self.path)?;
        if read_back != json {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Settings verification failed: wrote {} bytes, read {} bytes",
                    json.len(),
                    read_back.len()
                ),
            ));
        }

        info!("Bridge address saved to {:?}", self.path);
        Ok(())
    }
}

impl SettingsSource for FileSettings {
    fn bridge_address(&self) -> String {
        match self.load_document() {
            Ok(doc) => doc.map(|d| d.rileylink_address).unwrap_or_default(),
            Err(e) => {
                warn!("Ignoring unreadable settings file {:?}: {}", self.path, e);
                String::new()
            }
        }
    }
}

/// Get the default settings file path.
///
/// Returns `~/.bridge-link-gate/settings.json`
pub fn default_settings_path() -> io::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME not set"))?;
    Ok(PathBuf::from(home)
        .join(".bridge-link-gate")
        .join("settings.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU32, Ordering};

    // Counter to ensure unique test files even in parallel execution
    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn unique_settings_path() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let pid = std::process::id();
        env::temp_dir()
            .join(format!("bridge-gate-test-{}-{}", pid, id))
            .join("settings.json")
    }

    #[test]
    fn test_memory_settings() {
        let settings = MemorySettings::new("1a:2b:3c:4d:5e:6f");
        assert_eq!(settings.bridge_address(), "1a:2b:3c:4d:5e:6f");

        settings.set("");
        assert_eq!(settings.bridge_address(), "");
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let settings = FileSettings::new(unique_settings_path());
        assert_eq!(settings.bridge_address(), "");
    }

    #[test]
    fn test_save_and_load() {
        let path = unique_settings_path();
        let settings = FileSettings::new(&path);

        settings.save_bridge_address("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(settings.bridge_address(), "aa:bb:cc:dd:ee:ff");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_preserves_other_keys() {
        let path = unique_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"rileylink_address":"","pod_serial":"L12345"}"#).unwrap();

        let settings = FileSettings::new(&path);
        settings.save_bridge_address("1:2:3:4:5:6").unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw[BRIDGE_ADDRESS_KEY], "1:2:3:4:5:6");
        assert_eq!(raw["pod_serial"], "L12345");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_corrupt_file_reads_empty() {
        let path = unique_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "not json").unwrap();

        let settings = FileSettings::new(&path);
        assert_eq!(settings.bridge_address(), "");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_over_corrupt_file_keeps_it() {
        let path = unique_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let original = r#"{"rileylink_address":42,"pod_serial":"L12345"}"#;
        fs::write(&path, original).unwrap();

        let settings = FileSettings::new(&path);
        let err = settings.save_bridge_address("1:2:3:4:5:6").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert_eq!(fs::read_to_string(&path).unwrap(), original);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_creates_missing_file() {
        let path = unique_settings_path();
        let settings = FileSettings::new(&path);
        assert!(!path.exists());

        settings.save_bridge_address("1:2:3:4:5:6").unwrap();
        assert_eq!(settings.bridge_address(), "1:2:3:4:5:6");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_key_reads_empty() {
        let path = unique_settings_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"pod_serial":"L12345"}"#).unwrap();

        let settings = FileSettings::new(&path);
        assert_eq!(settings.bridge_address(), "");

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
