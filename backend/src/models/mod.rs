pub mod quest;
pub mod sprint_completion;

pub use quest::*;
pub use sprint_completion::*;
