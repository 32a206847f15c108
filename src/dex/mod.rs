pub mod engine;
pub mod random;
pub mod session;

pub use engine::*;
pub use random::*;
pub use session::*;
