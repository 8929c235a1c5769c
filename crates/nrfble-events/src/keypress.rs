//! Passkey keypress notification tracking.
//!
//! During passkey entry with keypress notifications enabled, each side
//! reports digit entry, digit deletion, clear, start and end. The display
//! side mirrors the remote's progress with a signed digit counter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keypress notification type, as spelled by the driver.
///
/// Unknown spellings are kept as [`KeypressType::Unrecognized`] and applying
/// them changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum KeypressType {
    /// Passkey entry started.
    Start,
    /// One digit entered.
    DigitIn,
    /// One digit erased.
    DigitOut,
    /// Entry cleared.
    Clear,
    /// Passkey entry completed.
    End,
    /// Anything else the driver reports.
    Unrecognized(String),
}

impl KeypressType {
    /// Driver spelling of this notification type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Start => "BLE_GAP_KP_NOT_TYPE_PASSKEY_START",
            Self::DigitIn => "BLE_GAP_KP_NOT_TYPE_PASSKEY_DIGIT_IN",
            Self::DigitOut => "BLE_GAP_KP_NOT_TYPE_PASSKEY_DIGIT_OUT",
            Self::Clear => "BLE_GAP_KP_NOT_TYPE_PASSKEY_CLEAR",
            Self::End => "BLE_GAP_KP_NOT_TYPE_PASSKEY_END",
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<&str> for KeypressType {
    fn from(raw: &str) -> Self {
        match raw {
            "BLE_GAP_KP_NOT_TYPE_PASSKEY_START" => Self::Start,
            "BLE_GAP_KP_NOT_TYPE_PASSKEY_DIGIT_IN" => Self::DigitIn,
            "BLE_GAP_KP_NOT_TYPE_PASSKEY_DIGIT_OUT" => Self::DigitOut,
            "BLE_GAP_KP_NOT_TYPE_PASSKEY_CLEAR" => Self::Clear,
            "BLE_GAP_KP_NOT_TYPE_PASSKEY_END" => Self::End,
            other => Self::Unrecognized(other.to_owned()),
        }
    }
}

impl From<String> for KeypressType {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<KeypressType> for String {
    fn from(kind: KeypressType) -> Self {
        match kind {
            KeypressType::Unrecognized(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for KeypressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keypress bookkeeping attached to every event.
///
/// Only passkey display and passkey request events ever enable it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeypressState {
    /// Remote sends keypress notifications to us.
    pub receive_enabled: bool,
    /// We send keypress notifications to the remote.
    pub send_enabled: bool,
    /// Remote reported the start of entry.
    pub start_received: bool,
    /// Remote reported the end of entry.
    pub end_received: bool,
    /// We reported the start of entry.
    pub start_sent: bool,
    /// We reported the end of entry.
    pub end_sent: bool,
    /// Digits currently entered. Signed: a peer may erase more than it typed.
    pub count: i32,
}

impl KeypressState {
    /// Bookkeeping for a passkey display exchange.
    pub fn receiving(enabled: bool) -> Self {
        Self { receive_enabled: enabled, ..Self::default() }
    }

    /// Bookkeeping for a passkey entry exchange.
    pub fn sending(enabled: bool) -> Self {
        Self { send_enabled: enabled, ..Self::default() }
    }

    /// Apply a notification received from the remote.
    ///
    /// Returns `false` if the notification type was unrecognized.
    pub fn record_received(&mut self, keypress: &KeypressType) -> bool {
        match keypress {
            KeypressType::Start => self.start_received = true,
            KeypressType::End => self.end_received = true,
            other => return self.count_digits(other),
        }
        true
    }

    /// Apply a notification we sent to the remote.
    ///
    /// Returns `false` if the notification type was unrecognized.
    pub fn record_sent(&mut self, keypress: &KeypressType) -> bool {
        match keypress {
            KeypressType::Start => self.start_sent = true,
            KeypressType::End => self.end_sent = true,
            other => return self.count_digits(other),
        }
        true
    }

    fn count_digits(&mut self, keypress: &KeypressType) -> bool {
        match keypress {
            KeypressType::DigitIn => self.count = self.count.saturating_add(1),
            KeypressType::DigitOut => self.count = self.count.saturating_sub(1),
            KeypressType::Clear => self.count = 0,
            KeypressType::Start | KeypressType::End | KeypressType::Unrecognized(_) => {
                return false;
            },
        }
        true
    }
}
