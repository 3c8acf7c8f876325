pub mod list;
pub mod validation;

pub use list::{List, ListName};
pub use validation::ValidationError;
