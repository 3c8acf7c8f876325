pub mod manager;
pub mod migrations;
pub mod models;
pub mod repository;
pub mod unit_of_work;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{List, ListName, ValidationError};
pub use repository::{ListRepository, PgListRepository};
pub use unit_of_work::UnitOfWork;
