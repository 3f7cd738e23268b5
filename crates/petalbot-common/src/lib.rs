pub mod context;
pub mod error;
pub mod turn;

pub use context::RequestContext;
pub use error::{Error, Result};
pub use turn::{Turn, TurnRole};
