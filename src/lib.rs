use std::{
    fs,
    io::{self, BufRead, Write},
    path::Path,
};

use log::{debug, trace};

pub mod ast_printer;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
pub mod syntax;
pub mod utils;
pub mod value;

use ast_printer::AstPrinter;
pub use error::{LoxError, ParseError, RuntimeError, ScanError};
use interpreter::Interpreter;
use parser::Parser;
pub use scanner::ScanMode;
use scanner::Scanner;
use utils::output::Output;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub scan_mode: ScanMode,
}

/// One interpreter session. Globals persist across calls to [`Lox::run`].
pub struct Lox {
    options: Options,
    interpreter: Interpreter,
}

impl Lox {
    pub fn new(options: Options) -> Self {
        Lox {
            options,
            interpreter: Interpreter::new(),
        }
    }

    pub fn with_output(options: Options, output: Box<dyn Output>) -> Self {
        Lox {
            options,
            interpreter: Interpreter::with_output(output),
        }
    }

    /// Scans, parses and executes `source`. Scan errors stop the run before
    /// parsing and parse errors stop it before execution.
    pub fn run(&mut self, source: &str) -> Result<(), LoxError> {
        let (tokens, errors) = Scanner::new(source).scan(self.options.scan_mode);
        if !errors.is_empty() {
            return Err(LoxError::Scan(errors));
        }
        debug!("scanned {} tokens", tokens.len());

        let (statements, errors) = Parser::new(&tokens).parse();
        if !errors.is_empty() {
            return Err(LoxError::Parse(errors));
        }
        for statement in &statements {
            trace!("{}", AstPrinter.print_stmt(statement));
        }

        self.interpreter.interpret(&statements)?;
        Ok(())
    }
}

/// Runs a whole script in a fresh session.
pub fn run_file(
    path: impl AsRef<Path>,
    options: Options,
    output: Option<Box<dyn Output>>,
) -> Result<(), LoxError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| LoxError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("running {}", path.display());

    let mut lox = match output {
        Some(output) => Lox::with_output(options, output),
        None => Lox::new(options),
    };
    lox.run(&source)
}

/// Reads lines from stdin and runs each one in a shared session. Errors are
/// reported and the prompt continues; EOF or `exit` ends it.
pub fn run_prompt(options: Options) -> io::Result<()> {
    let mut lox = Lox::new(options);
    let stdin = io::stdin();
    let mut input = stdin.lock();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut user_input = String::new();
        if input.read_line(&mut user_input)? == 0 {
            break;
        }

        let user_input = user_input.trim();
        if user_input == "exit" {
            break;
        }

        if let Err(e) = lox.run(user_input) {
            eprintln!("{e}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, fmt::Arguments, rc::Rc};

    use super::*;

    struct SharedOutput(Rc<RefCell<Vec<String>>>);

    impl Output for SharedOutput {
        fn print(&mut self, value: Arguments) {
            self.0.borrow_mut().push(value.to_string());
        }
    }

    fn session(options: Options) -> (Lox, Rc<RefCell<Vec<String>>>) {
        let logs = Rc::new(RefCell::new(vec![]));
        let lox = Lox::with_output(options, Box::new(SharedOutput(logs.clone())));
        (lox, logs)
    }

    #[test]
    fn scan_errors_are_batched_and_stop_the_run() {
        let (mut lox, logs) = session(Options::default());
        match lox.run("print 1; @ $") {
            Err(LoxError::Scan(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected scan errors, got {other:?}"),
        }
        assert!(logs.borrow().is_empty());
    }

    #[test]
    fn strict_mode_reports_only_the_first_scan_error() {
        let options = Options {
            scan_mode: ScanMode::Strict,
        };
        let (mut lox, _) = session(options);
        match lox.run("@ $") {
            Err(LoxError::Scan(errors)) => {
                assert_eq!(errors, vec![ScanError::new(1, "Unexpected character '@'.")])
            }
            other => panic!("expected scan errors, got {other:?}"),
        }
    }

    #[test]
    fn parse_errors_stop_before_execution() {
        let (mut lox, logs) = session(Options::default());
        let error = lox.run("print 1; print ;").unwrap_err();
        assert_eq!(error.exit_code(), 65);
        assert!(logs.borrow().is_empty());
    }

    #[test]
    fn runtime_error_after_output() {
        let (mut lox, logs) = session(Options::default());
        let error = lox.run("print 1; print x;").unwrap_err();
        assert_eq!(error.exit_code(), 70);
        assert_eq!(error.to_string(), "Undefined variable 'x'.\n[line 1]");
        assert_eq!(*logs.borrow(), vec!["1"]);
    }

    #[test]
    fn session_keeps_globals() {
        let (mut lox, logs) = session(Options::default());
        lox.run("var greeting = \"hi\";").unwrap();
        lox.run("print greeting;").unwrap();
        assert_eq!(*logs.borrow(), vec!["hi"]);
    }

    #[test]
    fn missing_file() {
        let error = run_file("does/not/exist.lox", Options::default(), None).unwrap_err();
        assert_eq!(error.exit_code(), 66);
    }
}
