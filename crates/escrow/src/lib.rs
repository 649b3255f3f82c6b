pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod funding;
pub mod guard;
pub mod ledger;
pub mod registry;
pub mod settlement;

pub use clock::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use funding::*;
pub use guard::*;
pub use ledger::*;
pub use registry::*;
pub use settlement::*;
