pub mod clock;
pub mod digest;
pub mod test_utils;

pub use clock::{Clock, FixedClock, SystemClock};
pub use digest::{digests_match, password_digest};
