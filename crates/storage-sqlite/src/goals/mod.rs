//! SQLite storage implementation for goals and their members.

mod model;
mod repository;

pub use model::{GoalChangesDB, GoalDB, GoalMemberDB};
pub use repository::GoalRepository;
