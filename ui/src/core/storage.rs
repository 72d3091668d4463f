//! Session-scoped persistence for the calibration data.
//!
//! Only two fields survive a reload: the calibration records and the PCA
//! suggestions. Both are stored as JSON under fixed keys and removed when the
//! value becomes empty. The browser build uses `window.sessionStorage`; native
//! builds keep an in-process map that lives as long as the app.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::Serialize;

use api::{CalibrationRecord, PcaSuggestions};

use super::error::StorageError;

pub const CALIBRATION_KEY: &str = "gaitvision.calibration";
pub const PCA_SUGGESTIONS_KEY: &str = "gaitvision.pca_suggestions";

pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store; also what tests run against.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::{SessionStore, StorageError};

    /// `window.sessionStorage`, looked up on every call.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct BrowserSessionStore;

    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|window| window.session_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)
    }

    fn backend(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
        StorageError::Backend {
            key: key.to_string(),
            message: format!("{err:?}"),
        }
    }

    impl SessionStore for BrowserSessionStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            storage()?.get_item(key).map_err(|err| backend(key, err))
        }

        fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
            storage()?.set_item(key, value).map_err(|err| backend(key, err))
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            storage()?.remove_item(key).map_err(|err| backend(key, err))
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserSessionStore;

/// Store backing the running app.
#[cfg(target_arch = "wasm32")]
pub fn session_store() -> &'static dyn SessionStore {
    static STORE: BrowserSessionStore = BrowserSessionStore;
    &STORE
}

/// Store backing the running app.
#[cfg(not(target_arch = "wasm32"))]
pub fn session_store() -> &'static dyn SessionStore {
    static STORE: once_cell::sync::Lazy<MemoryStore> = once_cell::sync::Lazy::new(MemoryStore::new);
    &*STORE
}

fn write_json<T: Serialize + ?Sized>(
    store: &dyn SessionStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let encoded = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded)
}

fn read_json<T: DeserializeOwned>(
    store: &dyn SessionStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StorageError::Corrupt {
            key: key.to_string(),
            source,
        })
}

pub fn persist_calibration(
    store: &dyn SessionStore,
    records: &[CalibrationRecord],
) -> Result<(), StorageError> {
    if records.is_empty() {
        store.remove(CALIBRATION_KEY)
    } else {
        write_json(store, CALIBRATION_KEY, records)
    }
}

pub fn load_calibration(
    store: &dyn SessionStore,
) -> Result<Option<Vec<CalibrationRecord>>, StorageError> {
    Ok(read_json::<Vec<CalibrationRecord>>(store, CALIBRATION_KEY)?
        .filter(|records| !records.is_empty()))
}

pub fn persist_pca_suggestions(
    store: &dyn SessionStore,
    suggestions: Option<&PcaSuggestions>,
) -> Result<(), StorageError> {
    match suggestions {
        Some(suggestions) if !suggestions.is_empty() => {
            write_json(store, PCA_SUGGESTIONS_KEY, suggestions)
        }
        _ => store.remove(PCA_SUGGESTIONS_KEY),
    }
}

pub fn load_pca_suggestions(
    store: &dyn SessionStore,
) -> Result<Option<PcaSuggestions>, StorageError> {
    Ok(read_json::<PcaSuggestions>(store, PCA_SUGGESTIONS_KEY)?
        .filter(|suggestions| !suggestions.is_empty()))
}
