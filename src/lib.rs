//! `klox` parses and runs programs written in klox, a tiny integer-only
//! language of top-level functions.
//!
//! Two things set it apart from a textbook tree-walker:
//! - there is no scanner. `core::combinator` is a small backtracking parser
//!   combinator library that works directly on the source text, and
//!   `core::parse` builds the whole grammar out of it, one function per rule
//! - errors are values. Parsing reports the failure that got furthest into
//!   the source as a `ParseError`; evaluation reports a `RuntimeError`, and
//!   `return` travels as `core::Flow` rather than as an error
//!
//! ```
//! let program = klox::parse("fn main() { return 1 + 2 * 3; }").unwrap();
//! assert_eq!(Ok(klox::Value(7)), klox::run(&program, "main", &[]));
//! ```
#![warn(clippy::pedantic)]

use std::io::{self, Write};

pub mod core;

pub use crate::core::{
    parse, Expected, KloxError, ParseError, ParseErrorKind, Program, RuntimeError, Value,
};
use crate::core::Interpreter;

pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Calls `entry` in `program` with `args`, sending `print` output to stdout.
///
/// # Errors
/// The first `RuntimeError` the run raises.
pub fn run(program: &Program, entry: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    let stdout = io::stdout();
    run_with_output(program, entry, args, stdout.lock())
}

/// Like `run`, but `print` writes to `output`.
///
/// # Errors
/// The first `RuntimeError` the run raises.
pub fn run_with_output<W: Write>(
    program: &Program,
    entry: &str,
    args: &[Value],
    output: W,
) -> Result<Value, RuntimeError> {
    Interpreter::new(program, output).run(entry, args)
}
