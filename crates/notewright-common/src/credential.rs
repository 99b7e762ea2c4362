//! The API credential entered on the settings page.
//!
//! Stored as plain text under a single key. Nothing here encrypts it; the
//! settings copy says as much.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::NotewrightError;

/// Storage key, shared with earlier builds of the web client.
pub const CREDENTIAL_KEY: &str = "anthropic_api_key";

const MASK_HEAD: usize = 7;
const MASK_TAIL: usize = 4;
const MASK_MIN_LEN: usize = 8;

pub trait CredentialStore {
    fn load(&self) -> Result<Option<String>, NotewrightError>;
    fn save(&self, value: &str) -> Result<(), NotewrightError>;
    fn clear(&self) -> Result<(), NotewrightError>;
}

/// In-process store for native builds and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    value: Rc<RefCell<Option<String>>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<String>, NotewrightError> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, value: &str) -> Result<(), NotewrightError> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), NotewrightError> {
        self.value.borrow_mut().take();
        Ok(())
    }
}

/// `window.localStorage`, written raw rather than JSON-encoded so values
/// saved by older clients still load.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserCredentialStore;

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
impl CredentialStore for BrowserCredentialStore {
    fn load(&self) -> Result<Option<String>, NotewrightError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .get_item(CREDENTIAL_KEY)
            .map_err(|e| NotewrightError::Storage(format!("{e:?}")))
    }

    fn save(&self, value: &str) -> Result<(), NotewrightError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::raw()
            .set_item(CREDENTIAL_KEY, value)
            .map_err(|e| NotewrightError::Storage(format!("{e:?}")))
    }

    fn clear(&self) -> Result<(), NotewrightError> {
        use gloo_storage::{LocalStorage, Storage};
        LocalStorage::delete(CREDENTIAL_KEY);
        Ok(())
    }
}

/// Platform default store.
#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub fn default_store() -> BrowserCredentialStore {
    BrowserCredentialStore
}

#[cfg(not(all(target_family = "wasm", target_os = "unknown")))]
pub fn default_store() -> MemoryCredentialStore {
    MemoryCredentialStore::new()
}

/// `sk-ant-••••••••wxyz` style display form.
pub fn mask_credential(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < MASK_MIN_LEN {
        return key.to_string();
    }
    let head: String = chars[..MASK_HEAD].iter().collect();
    let tail_start = chars.len().saturating_sub(MASK_TAIL).max(MASK_HEAD);
    let tail: String = chars[tail_start..].iter().collect();
    let hidden = chars.len().saturating_sub(MASK_HEAD + MASK_TAIL);
    format!("{head}{}{tail}", "•".repeat(hidden))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("sk-ant-abc").unwrap();
        assert_eq!(store.load().unwrap().as_deref(), Some("sk-ant-abc"));

        let shared = store.clone();
        shared.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn masks_middle_of_key() {
        assert_eq!(
            mask_credential("sk-ant-REDACTED"),
            format!("sk-ant-{}wxyz", "•".repeat(18))
        );
    }

    #[test]
    fn short_keys_shown_as_is() {
        assert_eq!(mask_credential("abc"), "abc");
        assert_eq!(mask_credential("1234567"), "1234567");
    }

    #[test]
    fn boundary_lengths_do_not_overlap() {
        // eight chars: head of seven plus the one remaining char
        assert_eq!(mask_credential("abcdefgh"), "abcdefgh");
        assert_eq!(mask_credential("abcdefghijk"), "abcdefghijk");
        assert_eq!(mask_credential("abcdefghijkl"), "abcdefg•ijkl");
    }
}
