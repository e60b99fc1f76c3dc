pub mod directory;
pub mod report;

pub use directory::{Directory, SharedDirectory};
