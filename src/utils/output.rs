use std::fmt::Arguments;

/// Destination for the text produced by `print` statements.
pub trait Output {
    fn print(&mut self, value: Arguments);
}

pub struct StdoutOutput;

impl Output for StdoutOutput {
    fn print(&mut self, value: Arguments) {
        println!("{}", value)
    }
}
