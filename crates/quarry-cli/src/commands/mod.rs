//! Command implementations.

pub mod extract;
pub mod init;
pub mod plan;

pub use self::extract::execute_extract;
pub use self::init::execute_init;
pub use self::plan::execute_plan;
