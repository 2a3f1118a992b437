//! Payment gateway factory.
//!
//! Selects and constructs the right gateway adapter for a requested
//! provider: checks enablement, decrypts credentials through the
//! `SecretCipher` port, and hands back a trait object. Explicit state
//! constructed once at startup; there is no process-wide gateway registry.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use crate::config::GatewaysConfig;
use crate::domain::payment::{GatewayKind, PaymentError};
use crate::ports::{GatewayFactory, PaymentGateway, SecretCipher};

use super::cryptomus::CryptomusGateway;
use super::telegram_stars::TelegramStarsGateway;
use super::yookassa::YookassaGateway;

/// Constructs gateway adapters from configuration records.
pub struct PaymentGatewayFactory {
    config: GatewaysConfig,
    cipher: Arc<dyn SecretCipher>,
    http: reqwest::Client,
}

impl PaymentGatewayFactory {
    /// Creates a factory sharing one HTTP client across all adapters.
    ///
    /// The client carries the configured provider timeout; every outbound
    /// call inherits it.
    pub fn new(config: GatewaysConfig, cipher: Arc<dyn SecretCipher>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("reqwest client construction cannot fail with static options");

        Self {
            config,
            cipher,
            http,
        }
    }

    fn create_yookassa(&self) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        let section = self
            .config
            .yookassa
            .as_ref()
            .filter(|c| c.enabled)
            .ok_or_else(|| disabled(GatewayKind::Yookassa))?;

        let secret_key = self.decrypt(GatewayKind::Yookassa, &section.secret_key)?;

        let mut gateway = match section.parsed_networks() {
            Some(networks) => YookassaGateway::with_trusted_networks(
                &section.shop_id,
                secret_key,
                &section.return_url,
                section.currency,
                networks,
                self.http.clone(),
            ),
            None => YookassaGateway::new(
                &section.shop_id,
                secret_key,
                &section.return_url,
                section.currency,
                self.http.clone(),
            ),
        };
        if let Some(base) = &section.api_base_url {
            gateway = gateway.with_api_base(base.as_str());
        }

        Ok(Arc::new(gateway))
    }

    fn create_telegram_stars(&self) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        let section = self
            .config
            .telegram_stars
            .as_ref()
            .filter(|c| c.enabled)
            .ok_or_else(|| disabled(GatewayKind::TelegramStars))?;

        let bot_token = self.decrypt(GatewayKind::TelegramStars, &section.bot_token)?;

        Ok(Arc::new(TelegramStarsGateway::new(
            bot_token,
            section.currency,
            self.http.clone(),
        )))
    }

    fn create_cryptomus(&self) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        let section = self
            .config
            .cryptomus
            .as_ref()
            .filter(|c| c.enabled)
            .ok_or_else(|| disabled(GatewayKind::Cryptomus))?;

        let api_key = self.decrypt(GatewayKind::Cryptomus, &section.api_key)?;
        let webhook_secret = section
            .webhook_secret
            .as_ref()
            .map(|blob| self.decrypt(GatewayKind::Cryptomus, blob))
            .transpose()?;

        Ok(Arc::new(CryptomusGateway::new(
            &section.merchant_id,
            api_key,
            webhook_secret,
            section.allow_unsigned,
            section.currency,
            self.http.clone(),
        )))
    }

    fn decrypt(&self, kind: GatewayKind, blob: &str) -> Result<SecretString, PaymentError> {
        self.cipher.decrypt(blob).map_err(|e| {
            tracing::error!(gateway = %kind, error = %e, "Credential decryption failed");
            PaymentError::configuration(kind, "credential decryption failed")
        })
    }
}

impl GatewayFactory for PaymentGatewayFactory {
    /// Builds the gateway for `kind`.
    ///
    /// # Errors
    ///
    /// `PaymentError::Configuration` when the gateway is absent from the
    /// configuration, disabled, or its credentials cannot be decrypted.
    /// Rejected before any network call.
    fn create(&self, kind: GatewayKind) -> Result<Arc<dyn PaymentGateway>, PaymentError> {
        match kind {
            GatewayKind::Yookassa => self.create_yookassa(),
            GatewayKind::TelegramStars => self.create_telegram_stars(),
            GatewayKind::Cryptomus => self.create_cryptomus(),
        }
    }
}

fn disabled(kind: GatewayKind) -> PaymentError {
    PaymentError::configuration(kind, "gateway is not configured or disabled")
}
