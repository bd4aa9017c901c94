//! Sources of input lines for the read-eval loop.

use anyhow::{Context, Result};
use log::warn;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::collections::VecDeque;
use std::io::{self, BufRead, Cursor, Write};

/// Something that can show a prompt and hand back the next input line.
///
/// Lines are raw bytes and may still carry their `'\n'` terminator; the loop
/// strips it. `Ok(None)` means the input is exhausted.
pub trait LineReader {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>>;
}

/// Read one `fgets`-style chunk: at most `limit` bytes, stopping after a newline.
///
/// `carry` holds bytes put back by the previous call and is consumed first. A
/// chunk that fills up in the middle of a UTF-8 sequence hands the started
/// sequence over to `carry` so it is read whole next time. An empty chunk means
/// end of input.
fn read_chunk<R: BufRead>(reader: &mut R, carry: &mut Vec<u8>, limit: usize) -> io::Result<Vec<u8>> {
    let mut buf = std::mem::take(carry);
    if buf.ends_with(b"\n") {
        return Ok(buf);
    }
    while buf.len() < limit {
        let available = match reader.fill_buf() {
            Ok(b) => b,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            return Ok(buf);
        }
        let window = &available[..available.len().min(limit - buf.len())];
        let (taken, line_done) = match window.iter().position(|&b| b == b'\n') {
            Some(i) => (i + 1, true),
            None => (window.len(), false),
        };
        buf.extend_from_slice(&window[..taken]);
        reader.consume(taken);
        if line_done {
            return Ok(buf);
        }
    }

    let tail = incomplete_utf8_tail(&buf);
    if tail < buf.len() {
        *carry = buf.split_off(tail);
    }
    Ok(buf)
}

/// Start of a UTF-8 sequence cut short at the end of `buf`, or `buf.len()`.
///
/// A sequence that is the whole buffer is never reported, so every chunk makes
/// progress.
fn incomplete_utf8_tail(buf: &[u8]) -> usize {
    let floor = buf.len().saturating_sub(3).max(1);
    for start in (floor..buf.len()).rev() {
        if buf[start] & 0b1100_0000 == 0b1000_0000 {
            continue;
        }
        return match std::str::from_utf8(&buf[start..]) {
            Err(e) if e.valid_up_to() == 0 && e.error_len().is_none() => start,
            _ => buf.len(),
        };
    }
    buf.len()
}

/// Plain reader with `fgets`-style bounded reads.
///
/// Each call consumes at most `max_input - 1` bytes, newline included, stopping
/// early after a newline. The rest of an over-long line is returned by the
/// following calls, each preceded by its own prompt.
pub struct BufferedInput<R, W> {
    reader: R,
    prompt_out: W,
    carry: Vec<u8>,
    max_input: usize,
}

impl<R: BufRead, W: Write> BufferedInput<R, W> {
    /// `max_input` counts the terminator and is raised to 2 if smaller.
    pub fn new(reader: R, prompt_out: W, max_input: usize) -> Self {
        Self {
            reader,
            prompt_out,
            carry: Vec::new(),
            max_input: max_input.max(2),
        }
    }
}

impl<R: BufRead, W: Write> LineReader for BufferedInput<R, W> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>> {
        write!(self.prompt_out, "{}", prompt)?;
        self.prompt_out.flush()?;

        let buf = read_chunk(&mut self.reader, &mut self.carry, self.max_input - 1)
            .context("failed to read standard input")?;
        if buf.is_empty() {
            return Ok(None);
        }
        Ok(Some(buf))
    }
}

/// Interactive reader backed by `rustyline`.
///
/// History is never recorded. Each edited line gets its newline back and is
/// cut exactly like [`BufferedInput`] cuts a line read from a pipe.
pub struct Terminal {
    editor: DefaultEditor,
    pending: VecDeque<Vec<u8>>,
    max_input: usize,
}

impl Terminal {
    pub fn new(max_input: usize) -> Result<Self> {
        let editor = DefaultEditor::new().context("failed to set up the terminal")?;
        Ok(Self {
            editor,
            pending: VecDeque::new(),
            max_input: max_input.max(2),
        })
    }
}

impl LineReader for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<Vec<u8>>> {
        if let Some(chunk) = self.pending.pop_front() {
            let mut stdout = io::stdout();
            write!(stdout, "{}", prompt)?;
            stdout.flush()?;
            return Ok(Some(chunk));
        }

        match self.editor.readline(prompt) {
            Ok(line) => {
                let mut chunks = line_chunks(line, self.max_input);
                let first = chunks.pop_front().unwrap_or_default();
                self.pending = chunks;
                Ok(Some(first))
            }
            // drop the line being edited and prompt again
            Err(ReadlineError::Interrupted) => Ok(Some(Vec::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(e)) if e.kind() == io::ErrorKind::Interrupted => {
                warn!("terminal read interrupted, prompting again");
                Ok(Some(Vec::new()))
            }
            Err(e) => Err(e).context("failed to read from the terminal"),
        }
    }
}

/// The chunks [`BufferedInput`] would return for `line` followed by a newline.
pub(crate) fn line_chunks(line: String, max_input: usize) -> VecDeque<Vec<u8>> {
    let mut bytes = line.into_bytes();
    bytes.push(b'\n');
    let mut reader = Cursor::new(bytes);
    let mut carry = Vec::new();
    let mut chunks = VecDeque::new();
    loop {
        // reading from memory cannot fail
        let chunk = read_chunk(&mut reader, &mut carry, max_input.max(2) - 1).unwrap_or_default();
        if chunk.is_empty() {
            return chunks;
        }
        chunks.push_back(chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &[u8], max_input: usize) -> BufferedInput<Cursor<Vec<u8>>, Vec<u8>> {
        BufferedInput::new(Cursor::new(input.to_vec()), Vec::new(), max_input)
    }

    fn read_all(input: &mut impl LineReader) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Some(line) = input.read_line("").unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn test_reads_one_line_per_call_and_prompts() {
        let mut input = reader(b"ls -l\ncd\n", 4096);

        assert_eq!(input.read_line("> ").unwrap(), Some(b"ls -l\n".to_vec()));
        assert_eq!(input.read_line("> ").unwrap(), Some(b"cd\n".to_vec()));
        assert_eq!(input.read_line("> ").unwrap(), None);
        assert_eq!(String::from_utf8(input.prompt_out).unwrap(), "> > > ");
    }

    #[test]
    fn test_last_line_without_newline() {
        let mut input = reader(b"exit", 4096);
        assert_eq!(input.read_line("> ").unwrap(), Some(b"exit".to_vec()));
        assert_eq!(input.read_line("> ").unwrap(), None);
    }

    #[test]
    fn test_long_line_is_delivered_in_chunks() {
        let mut input = reader(b"abcdefghij\nk\n", 8);

        assert_eq!(
            read_all(&mut input),
            vec![b"abcdefg".to_vec(), b"hij\n".to_vec(), b"k\n".to_vec()]
        );
    }

    #[test]
    fn test_newline_counts_toward_the_limit() {
        // seven bytes fill the chunk; the newline comes on its own
        let mut input = reader(b"abcdefg\n", 8);
        assert_eq!(read_all(&mut input), vec![b"abcdefg".to_vec(), b"\n".to_vec()]);
    }

    #[test]
    fn test_non_utf8_bytes_pass_through() {
        let mut input = reader(b"cd /tmp/d\xe9\n", 4096);
        assert_eq!(input.read_line("").unwrap(), Some(b"cd /tmp/d\xe9\n".to_vec()));
    }

    #[test]
    fn test_chunk_boundary_keeps_characters_whole() {
        // "ab" + 'é' (two bytes) does not fit in three bytes
        let mut input = reader("abéc\n".as_bytes(), 4);
        assert_eq!(
            read_all(&mut input),
            vec![b"ab".to_vec(), "éc".as_bytes().to_vec(), b"\n".to_vec()]
        );
    }

    #[test]
    fn test_stray_bytes_at_boundary_are_not_held_back() {
        let mut input = reader(b"ab\xff\xffc\n", 4);
        assert_eq!(read_all(&mut input), vec![b"ab\xff".to_vec(), b"\xffc\n".to_vec()]);
    }

    #[test]
    fn test_chunking_across_small_buffers() {
        // BufReader with a tiny capacity forces several fill_buf rounds per line
        let inner = Cursor::new(b"hello world\nbye\n".to_vec());
        let mut input = BufferedInput::new(io::BufReader::with_capacity(3, inner), Vec::new(), 4096);

        assert_eq!(
            read_all(&mut input),
            vec![b"hello world\n".to_vec(), b"bye\n".to_vec()]
        );
    }

    #[test]
    fn test_terminal_lines_are_cut_like_piped_lines() {
        for line in ["", "abcdef", "abcdefg", "abcdefghijklmno", "abcdeé", "ééééé"] {
            let piped = read_all(&mut reader(format!("{}\n", line).as_bytes(), 8));
            let edited: Vec<Vec<u8>> = line_chunks(line.to_string(), 8).into_iter().collect();
            assert_eq!(edited, piped, "line {:?}", line);
        }
    }

    #[test]
    fn test_full_length_terminal_line_yields_separate_newline() {
        let line = "x".repeat(4095);
        let chunks = line_chunks(line, 4096);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), 4095);
        assert_eq!(chunks[1], b"\n".to_vec());
    }
}
