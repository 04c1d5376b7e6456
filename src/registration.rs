//! Player registration
//!
//! Contact details are validated here; sending them to the event's
//! participant list is the host page's job. The last player is kept in
//! LocalStorage so the form is prefilled on "play again".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum phone length once whitespace is removed
pub const MIN_PHONE_LEN: usize = 8;

/// Displayed as-is under the intro form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("Merci d’indiquer votre nom complet.")]
    NameTooShort,
    #[error("Merci d’indiquer un numéro valide.")]
    PhoneTooShort,
}

/// A registered participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub phone: String,
}

impl Player {
    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "nutri_run_player";

    /// Normalise and validate raw form input
    pub fn register(name: &str, phone: &str) -> Result<Self, RegistrationError> {
        let name = name.trim();
        let phone: String = phone.chars().filter(|c| !c.is_whitespace()).collect();

        if name.chars().count() <= 1 {
            return Err(RegistrationError::NameTooShort);
        }
        if phone.chars().count() < MIN_PHONE_LEN {
            return Err(RegistrationError::PhoneTooShort);
        }

        Ok(Self {
            name: name.to_string(),
            phone,
        })
    }

    /// Load the last registered player from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load_last() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let json = storage.get_item(Self::STORAGE_KEY).ok()??;
        serde_json::from_str(&json).ok()
    }

    /// Remember this player for the next round (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save_last(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Player saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_last() -> Option<Self> {
        None
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_last(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_normalises_input() {
        let player = Player::register("  Camille  ", "06 12 34 56 78").unwrap();
        assert_eq!(player.name, "Camille");
        assert_eq!(player.phone, "0612345678");
    }

    #[test]
    fn test_register_rejects_short_fields() {
        assert_eq!(
            Player::register(" A ", "0612345678"),
            Err(RegistrationError::NameTooShort)
        );
        assert_eq!(
            Player::register("Camille", "06 12 34 5"),
            Err(RegistrationError::PhoneTooShort)
        );
        assert!(Player::register("Al", "12345678").is_ok());
    }

    #[test]
    fn test_errors_read_as_form_messages() {
        let name_err = Player::register("", "0612345678").unwrap_err();
        assert_eq!(name_err.to_string(), "Merci d’indiquer votre nom complet.");
        let phone_err = Player::register("Camille", "").unwrap_err();
        assert_eq!(phone_err.to_string(), "Merci d’indiquer un numéro valide.");
    }
}
