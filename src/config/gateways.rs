//! Payment gateway configuration.
//!
//! One section per provider. Credential fields hold encrypted blobs; the
//! factory decrypts them on demand through the `SecretCipher` port, so
//! plaintext secrets never sit in the config tree.

use ipnet::IpNet;
use serde::Deserialize;

use crate::domain::foundation::Currency;

use super::error::ValidationError;

/// Gateway configuration root.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaysConfig {
    /// YooKassa card checkout.
    pub yookassa: Option<YookassaConfig>,

    /// Telegram Stars in-chat payments.
    pub telegram_stars: Option<TelegramStarsConfig>,

    /// Cryptomus crypto invoices.
    pub cryptomus: Option<CryptomusConfig>,

    /// Timeout for outbound provider calls, in seconds.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    /// Age after which the sweep cancels pending transactions, in seconds.
    #[serde(default = "default_pending_ttl")]
    pub pending_ttl_secs: u64,
}

impl GatewaysConfig {
    /// Validate every configured gateway section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pending_ttl_secs == 0 {
            return Err(ValidationError::InvalidPendingTtl);
        }
        if let Some(yookassa) = &self.yookassa {
            yookassa.validate()?;
        }
        if let Some(stars) = &self.telegram_stars {
            stars.validate()?;
        }
        if let Some(cryptomus) = &self.cryptomus {
            cryptomus.validate()?;
        }
        Ok(())
    }
}

impl Default for GatewaysConfig {
    fn default() -> Self {
        Self {
            yookassa: None,
            telegram_stars: None,
            cryptomus: None,
            provider_timeout_secs: default_provider_timeout(),
            pending_ttl_secs: default_pending_ttl(),
        }
    }
}

/// YooKassa section.
#[derive(Debug, Clone, Deserialize)]
pub struct YookassaConfig {
    /// Whether the gateway is offered to users.
    #[serde(default)]
    pub enabled: bool,

    /// Shop identifier from the merchant dashboard.
    pub shop_id: String,

    /// Encrypted secret API key.
    pub secret_key: String,

    /// Where the checkout page sends the user afterwards.
    pub return_url: String,

    /// Charge currency.
    #[serde(default = "default_rub")]
    pub currency: Currency,

    /// Override of the provider's published webhook source ranges
    /// (staging tunnels, tests). CIDR notation.
    pub trusted_networks: Option<Vec<String>>,

    /// Override of the order API base URL (tests).
    pub api_base_url: Option<String>,
}

impl YookassaConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.shop_id.is_empty() {
            return Err(ValidationError::MissingRequired("YOOKASSA_SHOP_ID"));
        }
        if self.secret_key.is_empty() {
            return Err(ValidationError::MissingRequired("YOOKASSA_SECRET_KEY"));
        }
        if !self.return_url.starts_with("http://") && !self.return_url.starts_with("https://") {
            return Err(ValidationError::InvalidReturnUrl);
        }
        if let Some(networks) = &self.trusted_networks {
            for network in networks {
                if network.parse::<IpNet>().is_err() {
                    return Err(ValidationError::InvalidTrustedNetwork(network.clone()));
                }
            }
        }
        Ok(())
    }

    /// Parsed allowlist override, if one is configured.
    ///
    /// Call after `validate()`; unparseable entries are skipped here.
    pub fn parsed_networks(&self) -> Option<Vec<IpNet>> {
        self.trusted_networks
            .as_ref()
            .map(|list| list.iter().filter_map(|s| s.parse().ok()).collect())
    }
}

/// Telegram Stars section.
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramStarsConfig {
    /// Whether the gateway is offered to users.
    #[serde(default)]
    pub enabled: bool,

    /// Encrypted bot token.
    pub bot_token: String,

    /// Charge currency; Stars payments are always XTR.
    #[serde(default = "default_xtr")]
    pub currency: Currency,
}

impl TelegramStarsConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.bot_token.is_empty() {
            return Err(ValidationError::MissingRequired("TELEGRAM_BOT_TOKEN"));
        }
        Ok(())
    }
}

/// Cryptomus section.
#[derive(Debug, Clone, Deserialize)]
pub struct CryptomusConfig {
    /// Whether the gateway is offered to users.
    #[serde(default)]
    pub enabled: bool,

    /// Merchant identifier.
    pub merchant_id: String,

    /// Encrypted API key used to sign outbound requests.
    pub api_key: String,

    /// Encrypted webhook signing secret.
    pub webhook_secret: Option<String>,

    /// Accept unsigned webhooks when no secret is configured. Explicit
    /// opt-in only; a missing secret otherwise fails closed.
    #[serde(default)]
    pub allow_unsigned: bool,

    /// Invoice currency.
    #[serde(default = "default_usd")]
    pub currency: Currency,
}

impl CryptomusConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if self.merchant_id.is_empty() {
            return Err(ValidationError::MissingRequired("CRYPTOMUS_MERCHANT_ID"));
        }
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("CRYPTOMUS_API_KEY"));
        }
        if self.webhook_secret.is_none() && !self.allow_unsigned {
            return Err(ValidationError::UnverifiableWebhooks("cryptomus"));
        }
        Ok(())
    }
}

fn default_provider_timeout() -> u64 {
    10
}

fn default_pending_ttl() -> u64 {
    // One hour: checkout links have expired well before this.
    3600
}

fn default_rub() -> Currency {
    Currency::Rub
}

fn default_xtr() -> Currency {
    Currency::Xtr
}

fn default_usd() -> Currency {
    Currency::Usd
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yookassa() -> YookassaConfig {
        YookassaConfig {
            enabled: true,
            shop_id: "shop-123".into(),
            secret_key: "enc:abcdef".into(),
            return_url: "https://shop.example/return".into(),
            currency: Currency::Rub,
            trusted_networks: None,
            api_base_url: None,
        }
    }

    fn cryptomus() -> CryptomusConfig {
        CryptomusConfig {
            enabled: true,
            merchant_id: "merchant-1".into(),
            api_key: "enc:abcdef".into(),
            webhook_secret: Some("enc:123456".into()),
            allow_unsigned: false,
            currency: Currency::Usd,
        }
    }

    #[test]
    fn disabled_sections_skip_validation() {
        let config = YookassaConfig {
            enabled: false,
            shop_id: String::new(),
            secret_key: String::new(),
            return_url: String::new(),
            currency: Currency::Rub,
            trusted_networks: None,
            api_base_url: None,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn enabled_yookassa_requires_credentials() {
        let config = YookassaConfig {
            shop_id: String::new(),
            ..yookassa()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("YOOKASSA_SHOP_ID"))
        ));
    }

    #[test]
    fn relative_return_url_is_rejected() {
        let config = YookassaConfig {
            return_url: "/return".into(),
            ..yookassa()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidReturnUrl)
        ));
    }

    #[test]
    fn malformed_trusted_network_is_rejected() {
        let config = YookassaConfig {
            trusted_networks: Some(vec!["10.0.0.0/8".into(), "not-a-cidr".into()]),
            ..yookassa()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidTrustedNetwork(_))
        ));
    }

    #[test]
    fn trusted_networks_parse_to_ipnets() {
        let config = YookassaConfig {
            trusted_networks: Some(vec!["10.0.0.0/8".into()]),
            ..yookassa()
        };
        let parsed = config.parsed_networks().unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn cryptomus_without_secret_or_opt_in_is_rejected() {
        let config = CryptomusConfig {
            webhook_secret: None,
            ..cryptomus()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::UnverifiableWebhooks("cryptomus"))
        ));
    }

    #[test]
    fn cryptomus_without_secret_but_with_opt_in_passes() {
        let config = CryptomusConfig {
            webhook_secret: None,
            allow_unsigned: true,
            ..cryptomus()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn stars_requires_bot_token_when_enabled() {
        let config = TelegramStarsConfig {
            enabled: true,
            bot_token: String::new(),
            currency: Currency::Xtr,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_pending_ttl_is_rejected() {
        let config = GatewaysConfig {
            pending_ttl_secs: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidPendingTtl)
        ));
    }
}
