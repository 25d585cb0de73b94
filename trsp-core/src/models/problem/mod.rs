//! Problem domain models.

mod builders;
pub use self::builders::*;

mod instance;
pub use self::instance::*;
