pub mod clock;
pub mod currency;
pub mod error;
pub mod response;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use currency::Currency;
pub use error::{AppError, ErrorCode, FieldIssue, Result};
pub use response::ActionResult;
