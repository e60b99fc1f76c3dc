// =====================================================================================
// SESSION CELL - LOGIN, ROLE-SCOPED DISPATCH & LOGOUT
// =====================================================================================

pub mod handlers;
pub mod models;
pub mod router;

pub use handlers::SessionDispatcher;
pub use models::{Operation, OperationKind, OperationOutcome, Session};
pub use router::{is_permitted, permitted_operations};
