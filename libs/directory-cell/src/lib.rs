pub mod models;
pub mod services;

pub use models::{DirectoryError, DirectoryReport};
pub use services::directory::{Directory, SharedDirectory};
