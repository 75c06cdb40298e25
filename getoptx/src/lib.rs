//! `getoptx`: an extended `getopts` with long options.
//!
//! The builtin parses an argument list against a short-option spec and
//! any number of long-option specs, and renders the result as a single
//! re-parseable shell string: options first, then `--`, then the quoted
//! operands.

pub mod arguments;
pub mod builtin;
pub mod classify;
pub mod error;
pub mod host;
pub mod logging;
pub mod longopts;
pub mod quote;
pub mod render;

pub use builtin::run;
pub use error::{GetoptxError, Result};
