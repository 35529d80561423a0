//! HTTP delivery channel.

mod channel;
mod payload;
mod settings;

pub use channel::HttpDeliveryChannel;
pub use payload::extract_payload;
pub use settings::HttpConfig;
