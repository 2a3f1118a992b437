//! SubscriptionExtender adapters.

mod http_extender;

pub use http_extender::HttpSubscriptionExtender;
