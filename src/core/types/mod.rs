pub mod config;
mod error;
mod score;
mod spectrum;
mod statement;

pub use error::*;
pub use score::*;
pub use spectrum::*;
pub use statement::*;
