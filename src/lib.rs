//! The most basic interactive shell one can think of.
//!
//! This crate reads a line, splits it on spaces into a command name and its
//! arguments, and either handles it in-process (`cd`, `exit`) or starts the named
//! program and waits for it before prompting again. There are no pipes, no
//! redirections, no quoting and no variable expansion.
//!
//! The main entry point is [`Interpreter`]. Input comes from any
//! [`io_adapters::LineReader`], so the whole read-eval loop can be driven from
//! memory in tests; the `tshell` binary wires it to the terminal.

mod builtin;
pub mod command;
pub mod env;
mod external;
mod interpreter;
pub mod io_adapters;
pub mod lexer;

#[cfg(test)]
mod testing;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API.
pub use interpreter::{Interpreter, PROMPT};
pub use lexer::{Lexer, MAX_INPUT};
