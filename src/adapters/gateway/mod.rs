//! Payment gateway adapters.

mod mock_gateway;

pub use mock_gateway::{GatewayCall, MockPaymentGateway};
