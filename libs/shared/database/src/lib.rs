pub mod codec;
pub mod snapshot;

pub use codec::RecordError;
pub use snapshot::{FileSnapshotStore, SnapshotStore};
