use argh::FromArgs;
use log::{LevelFilter, debug};
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use tshell::io_adapters::{BufferedInput, LineReader, Terminal};
use tshell::{Interpreter, Lexer, MAX_INPUT};

#[derive(FromArgs)]
/// Tiny shell: reads a command per line and runs it.
struct Args {
    #[argh(option, default = "MAX_INPUT")]
    /// maximum length of an input line in bytes, line terminator included (at least 2).
    max_input: usize,

    #[argh(switch)]
    /// read plain standard input without line editing, even on a terminal.
    no_editor: bool,

    #[argh(switch, short = 'v')]
    /// log dispatch decisions to standard error.
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

/// Exit status for arguments that parse but cannot be used.
fn check_args(args: &Args) -> Option<u8> {
    if args.max_input < 2 {
        eprintln!("Tshell: --max-input must be at least 2");
        return Some(2);
    }
    None
}

/// Whether to read through the line editor rather than plain standard input.
fn wants_terminal(args: &Args, stdin_is_terminal: bool) -> bool {
    !args.no_editor && stdin_is_terminal
}

fn open_input(args: &Args) -> anyhow::Result<Box<dyn LineReader>> {
    if wants_terminal(args, io::stdin().is_terminal()) {
        debug!("reading from the terminal");
        return Ok(Box::new(Terminal::new(args.max_input)?));
    }
    Ok(Box::new(BufferedInput::new(io::stdin().lock(), io::stdout(), args.max_input)))
}

/// Run the shell over `input` and map the outcome to the process exit status.
fn run(args: &Args, input: &mut dyn LineReader) -> u8 {
    let mut sh = Interpreter::default().with_lexer(Lexer::new(args.max_input - 1));
    match sh.repl(input) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Tshell: {:#}", e);
            1
        }
    }
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    if let Some(code) = check_args(&args) {
        return ExitCode::from(code);
    }
    init_logging(args.verbose);

    let status = match open_input(&args) {
        Ok(mut input) => run(&args, input.as_mut()),
        Err(e) => {
            eprintln!("Tshell: {:#}", e);
            1
        }
    };
    ExitCode::from(status)
}
