mod catalog;
mod git;
mod launch;
mod logging;
mod settings;
mod worktrees;

pub use catalog::*;
pub use git::*;
pub use launch::*;
pub use logging::*;
pub use settings::*;
pub use worktrees::*;
