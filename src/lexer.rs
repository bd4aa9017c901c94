//! Splitting an input line into the argument vector of a command.

use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;

/// Maximum length of an input line in bytes, line terminator included.
pub const MAX_INPUT: usize = 4096;

/// Splits input lines on single spaces.
///
/// Lines are raw bytes and tokens keep them untouched, valid UTF-8 or not. Only
/// the space byte separates tokens; tabs and everything else are part of a
/// token. A token longer than `max_token_len` bytes is cut at that length and
/// the rest of it starts the next token. The cut never falls inside a UTF-8
/// sequence, so a capped token may be a few bytes shorter than the limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexer {
    max_token_len: usize,
}

impl Lexer {
    /// Create a lexer capping tokens at `max_token_len` bytes.
    ///
    /// A limit of zero is raised to one so that every character still ends up in
    /// some token.
    pub fn new(max_token_len: usize) -> Self {
        Self {
            max_token_len: max_token_len.max(1),
        }
    }

    /// Longest token this lexer emits, in bytes.
    pub fn max_token_len(&self) -> usize {
        self.max_token_len
    }

    /// Split `line` into its non-empty tokens, in input order.
    ///
    /// The caller strips the line terminator beforehand. An empty result means
    /// there is no command on the line.
    pub fn tokenize(&self, line: &[u8]) -> Vec<OsString> {
        let mut tokens = Vec::new();
        let mut current = Vec::new();

        for chunk in line.utf8_chunks() {
            for ch in chunk.valid().chars() {
                if ch == ' ' {
                    flush(&mut current, &mut tokens);
                    continue;
                }
                let mut buf = [0u8; 4];
                self.push_unit(ch.encode_utf8(&mut buf).as_bytes(), &mut current, &mut tokens);
            }
            // stray bytes count one at a time
            for &b in chunk.invalid() {
                self.push_unit(&[b], &mut current, &mut tokens);
            }
        }
        flush(&mut current, &mut tokens);

        tokens.shrink_to_fit();
        tokens
    }

    fn push_unit(&self, unit: &[u8], current: &mut Vec<u8>, tokens: &mut Vec<OsString>) {
        if current.len() + unit.len() > self.max_token_len {
            flush(current, tokens);
        }
        current.extend_from_slice(unit);
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(MAX_INPUT - 1)
    }
}

fn flush(current: &mut Vec<u8>, tokens: &mut Vec<OsString>) {
    if !current.is_empty() {
        tokens.push(OsString::from_vec(std::mem::take(current)));
    }
}

/// Tokenize `line` with the default token length limit.
pub fn tokenize(line: &[u8]) -> Vec<OsString> {
    Lexer::default().tokenize(line)
}
