//! SQLite storage implementation for login codes.

mod model;
mod repository;

pub use model::LoginCodeDB;
pub use repository::LoginCodeRepository;
