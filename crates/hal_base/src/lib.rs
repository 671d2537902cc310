/* 📖 # Why have hal_base as a separate crate?
hal_base provides the error type and tracing setup used by every other crate.
Keeping it apart from the document model lets the CLI and the library share one
error vocabulary without depending on each other.
*/

pub mod error;
pub mod tracing;

pub use error::{ErrorKind, HalError, HalResult, ResultExt};
