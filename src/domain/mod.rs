//! Order rules that hold regardless of where orders are stored or how they arrive.

pub mod cart;
pub mod errors;
pub mod order_number;
pub mod pricing;
pub mod status;
