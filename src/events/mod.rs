//! User-visible notifications raised by the editor.
//!
//! Every mutating call to the persistence collaborator surfaces its outcome as
//! a transient [`Notification`] the host can display and discard.

use serde::{Deserialize, Serialize};

use crate::utils;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub message: String,
    /// Timestamp in milliseconds.
    pub timestamp: i64,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: utils::shortid(),
            level,
            message: message.into(),
            timestamp: utils::time::time_millis(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }
}
