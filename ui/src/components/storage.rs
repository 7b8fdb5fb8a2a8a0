use grafoman_common::app_state::KeyValueStore;

/// The store the designer persists to: localStorage in the browser, memory
/// elsewhere.
pub fn browser_store() -> Box<dyn KeyValueStore> {
    #[cfg(target_family = "wasm")]
    {
        Box::new(wasm::LocalStore)
    }
    #[cfg(not(target_family = "wasm"))]
    {
        Box::new(grafoman_common::app_state::MemoryStore::new())
    }
}

#[cfg(target_family = "wasm")]
mod wasm {
    use grafoman_common::app_state::KeyValueStore;
    use grafoman_common::error::StorageError;

    /// `window.localStorage`, looked up on every access so a storage that
    /// appears or disappears mid-session is handled.
    pub struct LocalStore;

    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window = web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".into()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage disabled".into()))
    }

    impl KeyValueStore for LocalStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            storage()?
                .get_item(key)
                .map_err(|e| StorageError::Unavailable(format!("{:?}", e)))
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            // setItem only throws on quota or on a storage locked by privacy settings.
            storage()?
                .set_item(key, value)
                .map_err(|_| StorageError::QuotaExceeded)
        }
    }
}
