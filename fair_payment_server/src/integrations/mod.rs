//! Implementations of the payment engine's outbound traits: the card payment gateway and email notifications.
pub mod email;
pub mod gateway;

pub use email::{ConfiguredNotifier, EmailNotifier};
pub use gateway::GatewayClient;
