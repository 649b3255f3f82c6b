pub mod digest;
pub mod order;
pub mod signing;
pub mod trade;

pub use digest::*;
pub use order::*;
pub use signing::*;
pub use trade::*;

pub const PROTOCOL_VERSION: &str = "1.0";
