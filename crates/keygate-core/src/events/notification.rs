//! Notification event tags
//!
//! Every message handed to the `Notifier` carries one of these tags so that
//! the delivery side can route, filter, or audit without parsing message
//! text. The wire names are stable identifiers; do not rename them.

use serde::{Deserialize, Serialize};

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationEvent {
    UserRegistered,
    UserLogin,
    UserLogout,
    UserLogoutAll,
    TokensRefreshed,
    /// Refresh-token replay detected; all sessions were revoked
    SecurityAlert,
    PasswordChanged,
    #[serde(rename = "new_2fa_code")]
    NewTwoFactorCode,
    #[serde(rename = "2fa_verified")]
    TwoFactorVerified,
    #[serde(rename = "2fa_enabled")]
    TwoFactorEnabled,
    #[serde(rename = "2fa_disabled")]
    TwoFactorDisabled,
}

impl NotificationEvent {
    /// Stable tag string, identical to the serde wire name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UserRegistered => "user_registered",
            Self::UserLogin => "user_login",
            Self::UserLogout => "user_logout",
            Self::UserLogoutAll => "user_logout_all",
            Self::TokensRefreshed => "tokens_refreshed",
            Self::SecurityAlert => "security_alert",
            Self::PasswordChanged => "password_changed",
            Self::NewTwoFactorCode => "new_2fa_code",
            Self::TwoFactorVerified => "2fa_verified",
            Self::TwoFactorEnabled => "2fa_enabled",
            Self::TwoFactorDisabled => "2fa_disabled",
        }
    }
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
