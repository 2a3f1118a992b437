//! Payment gateway kinds supported by the shop.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// The payment providers a transaction can run through.
///
/// Adding a provider means adding a variant here plus a gateway adapter,
/// a config section, and a factory arm; nothing else branches on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    /// Card checkout with a hosted redirect page.
    Yookassa,
    /// In-chat payment with Telegram Stars; no HTTP webhook.
    TelegramStars,
    /// Crypto invoices with HMAC-signed webhooks.
    Cryptomus,
}

impl GatewayKind {
    /// Stable string form used in storage and webhook routes.
    pub fn as_str(&self) -> &'static str {
        match self {
            GatewayKind::Yookassa => "yookassa",
            GatewayKind::TelegramStars => "telegram_stars",
            GatewayKind::Cryptomus => "cryptomus",
        }
    }

    /// True when confirmation arrives over HTTP rather than a platform update.
    pub fn has_webhook(&self) -> bool {
        !matches!(self, GatewayKind::TelegramStars)
    }
}

impl fmt::Display for GatewayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GatewayKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yookassa" => Ok(GatewayKind::Yookassa),
            "telegram_stars" => Ok(GatewayKind::TelegramStars),
            "cryptomus" => Ok(GatewayKind::Cryptomus),
            other => Err(ValidationError::invalid_format(
                "gateway_kind",
                format!("Unknown gateway: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_form_round_trips() {
        for kind in [
            GatewayKind::Yookassa,
            GatewayKind::TelegramStars,
            GatewayKind::Cryptomus,
        ] {
            assert_eq!(kind.as_str().parse::<GatewayKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_gateway_is_rejected() {
        assert!("paypal".parse::<GatewayKind>().is_err());
    }

    #[test]
    fn only_stars_lacks_a_webhook() {
        assert!(GatewayKind::Yookassa.has_webhook());
        assert!(GatewayKind::Cryptomus.has_webhook());
        assert!(!GatewayKind::TelegramStars.has_webhook());
    }
}
