//! Yes/no confirmation for overwrite and destructive actions

use async_trait::async_trait;

/// Question put to the user before a remote write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub title: String,
    pub message: String,
}

impl ConfirmRequest {
    pub fn field_update(old_value: &str, new_value: &str) -> Self {
        Self {
            title: "Potvrda".to_string(),
            message: format!(
                "Da li želite da napravite izmenu?\nPrethodna vrednost: {}\nNova vrednost: {}",
                old_value, new_value
            ),
        }
    }

    pub fn delete() -> Self {
        Self {
            title: "Confirmation".to_string(),
            message: "Are you sure you want to delete this item?".to_string(),
        }
    }

    pub fn service_update() -> Self {
        Self {
            title: "Potvrda".to_string(),
            message: "Da li ste sigurni da želite da ažurirate ovaj servis?".to_string(),
        }
    }
}

/// Asks the user to confirm an action.
///
/// Implemented by frontends; declining is the only recoverable outcome of an
/// overwrite or delete.
#[async_trait]
pub trait Confirmer: Send {
    async fn confirm(&mut self, request: &ConfirmRequest) -> bool;
}
