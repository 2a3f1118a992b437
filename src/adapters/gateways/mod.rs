//! Payment gateway adapters.
//!
//! One module per provider plus the factory that selects among them.
//! Each adapter implements the `PaymentGateway` port; nothing outside this
//! module knows provider wire formats.

mod cryptomus;
mod factory;
mod telegram_stars;
mod yookassa;

pub use cryptomus::CryptomusGateway;
pub use factory::PaymentGatewayFactory;
pub use telegram_stars::TelegramStarsGateway;
pub use yookassa::YookassaGateway;
