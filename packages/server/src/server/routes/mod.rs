// HTTP routes
pub mod documents;
pub mod extraction;
pub mod health;
pub mod stats;
pub mod ws;

pub use documents::*;
pub use extraction::*;
pub use health::*;
pub use stats::*;
pub use ws::*;
