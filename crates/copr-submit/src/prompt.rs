use std::io;

use dialoguer::{Input, Password};

/// Source of interactive answers.
pub(crate) trait Prompter {
    /// Ask for a single line of input.
    ///
    /// An empty answer is returned as an empty string; when a `default`
    /// is provided, an empty answer yields the default instead.
    fn ask(&self, question: &str, default: Option<&str>) -> io::Result<String>;

    /// Ask for a value without echoing it back.
    fn ask_secret(&self, question: &str) -> io::Result<String>;
}

/// [`Prompter`] reading answers from the controlling terminal.
pub(crate) struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> io::Result<String> {
        let mut input = Input::<String>::new();

        input.with_prompt(question).allow_empty(true);

        if let Some(default) = default {
            input.default(default.to_owned()).show_default(true);
        }

        input.interact_text()
    }

    fn ask_secret(&self, question: &str) -> io::Result<String> {
        Password::new().with_prompt(question).interact()
    }
}
