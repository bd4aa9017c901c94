use crate::command::{CommandFactory, ExitCode};
use crate::env::Environment;
use crate::io_adapters::LineReader;
use crate::lexer::Lexer;
use anyhow::Result;
use log::debug;
use std::ffi::{OsStr, OsString};
use std::io::{self, Write};

/// Prompt printed before every line is read.
pub const PROMPT: &str = "> ";

/// Factory allows creating instances of ExecutableCommand.
///
/// Only supports the commands defined in this crate: builtins and ExternalCommand.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

/// A minimal shell-like interpreter that can execute built-in and external commands.
///
/// The interpreter maintains an [`Environment`] and a list of [`CommandFactory`] objects
/// that are queried in order to create commands by name. See [`Default`] for the
/// factories included out of the box.
///
/// Example
/// ```no_run
/// use tshell::Interpreter;
/// let mut sh = Interpreter::default();
/// let code = sh.dispatch(&["true".into()]).unwrap();
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    lexer: Lexer,
    commands: Vec<Box<dyn CommandFactory>>,
}

impl Interpreter {
    /// Create a new interpreter with a custom set of command factories.
    pub fn new(commands: Vec<Box<dyn CommandFactory>>) -> Self {
        Self {
            env: Environment::new(),
            lexer: Lexer::default(),
            commands,
        }
    }

    /// Replace the tokenizer, e.g. to change the token length limit.
    pub fn with_lexer(mut self, lexer: Lexer) -> Self {
        self.lexer = lexer;
        self
    }

    /// Whether `exit` has been run.
    pub fn should_exit(&self) -> bool {
        self.env.should_exit
    }

    /// Run one tokenized command line, reporting problems on standard error.
    ///
    /// `tokens` must not be empty. Returns the command's exit code; failures of the
    /// command itself are already reported and never surface as `Err`.
    pub fn dispatch(&mut self, tokens: &[OsString]) -> Result<ExitCode> {
        self.dispatch_with_stderr(tokens, &mut io::stderr())
    }

    fn dispatch_with_stderr(&mut self, tokens: &[OsString], stderr: &mut dyn Write) -> Result<ExitCode> {
        let Some((name, rest)) = tokens.split_first() else {
            return Ok(0);
        };
        let args: Vec<&OsStr> = rest.iter().map(OsString::as_os_str).collect();

        for factory in &self.commands {
            if let Some(cmd) = factory.try_create(&self.env, name, &args) {
                let code = cmd.execute(stderr, &mut self.env)?;
                debug!("{:?} finished with {}", name, code);
                return Ok(code);
            }
        }
        stderr.write_all(b"Tshell: ")?;
        stderr.write_all(name.as_encoded_bytes())?;
        stderr.write_all(b": command not found\n")?;
        Ok(127)
    }

    /// Read-eval loop on the real standard error.
    ///
    /// Returns when `exit` runs or `input` is exhausted.
    pub fn repl(&mut self, input: &mut dyn LineReader) -> Result<()> {
        self.repl_with_stderr(input, &mut io::stderr())
    }

    fn repl_with_stderr(&mut self, input: &mut dyn LineReader, stderr: &mut dyn Write) -> Result<()> {
        while !self.env.should_exit {
            let Some(line) = input.read_line(PROMPT)? else {
                debug!("end of input");
                break;
            };
            let line = line.strip_suffix(b"\n").unwrap_or(&line);

            let tokens = self.lexer.tokenize(line);
            if tokens.is_empty() {
                continue;
            }
            debug!("tokens: {:?}", tokens);

            self.dispatch_with_stderr(&tokens, stderr)?;
        }
        Ok(())
    }
}

impl Default for Interpreter {
    /// Create an interpreter with the default set of commands:
    /// - built-ins: `cd`, `exit`
    /// - external command launcher, which accepts any other name
    fn default() -> Self {
        use crate::builtin::*;
        use crate::external::ExternalCommand;
        Self::new(vec![
            Box::new(Factory::<Cd>::default()),
            Box::new(Factory::<Exit>::default()),
            Box::new(Factory::<ExternalCommand>::default()),
        ])
    }
}
