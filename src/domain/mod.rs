mod aggregate;
mod launch;
mod parse;
mod query;
mod types;

pub use aggregate::*;
pub use launch::*;
pub use parse::*;
pub use query::*;
pub use types::*;
