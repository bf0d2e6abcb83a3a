//! Domain model: host checkout data, payment API objects and the ports the
//! application layer talks through.

pub mod money;
pub mod order;
pub mod payment_method;
pub mod ports;
pub mod settings;
pub mod validation;
pub mod vendor;
