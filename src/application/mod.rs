//! Application layer: payload builders and the services behind the HTTP
//! endpoints and console commands.
//!
//! Builders (`transaction_payload`, `refund_payload`) are pure and only read
//! their inputs. Services reach the payment API and the configuration store
//! through the ports in [`crate::domain::ports`].

pub mod payment_method;
pub mod refund;
pub mod refund_payload;
pub mod settings;
pub mod transaction;
pub mod transaction_payload;
