//! Operator prompts.
//!
//! [`Prompter`] is what the menu and the folder operations talk to.
//! [`Terminal`] drives a real terminal with `dialoguer`; [`Console`] is the
//! line-oriented version over any reader/writer pair, used for piped input
//! and scripted sessions.

use std::fmt::Display;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

use dialoguer::{Input, Select};

use crate::auth::CodePrompt;
use crate::error::{DriveError, Result};

/// Questions the interactive tool asks the operator.
pub trait Prompter {
    /// Where reports (tree listings, results) are written.
    type Output: Write;

    fn output(&mut self) -> &mut Self::Output;

    /// Write a line of text.
    fn say(&mut self, message: impl Display) -> Result<()> {
        writeln!(self.output(), "{}", message)?;
        Ok(())
    }

    /// Ask for one line of free text, trimmed. An empty answer is allowed.
    fn prompt(&mut self, message: &str) -> Result<String>;

    /// Pick one of `items` and return its 0-based index.
    fn choose(&mut self, message: &str, items: &[String]) -> Result<usize>;

    /// Pick one of the `(key, label)` options and return the chosen key.
    fn pick(&mut self, message: &str, options: &[(&str, &str)]) -> Result<String>;

    /// Ask a yes/no question; only `y` or `Y` confirms.
    fn confirm(&mut self, message: &str) -> Result<bool> {
        let answer = self.prompt(&format!("{} (y/N)", message))?;
        Ok(answer == "y" || answer == "Y")
    }
}

fn show_authorization<P: Prompter>(prompter: &mut P, auth_url: &str) -> Result<String> {
    prompter.say("\n=== AUTHORIZATION ===")?;
    prompter.say("1. Open this URL in a browser:")?;
    prompter.say(format!("\n{}\n", auth_url))?;
    prompter.say("2. Sign in and allow access")?;
    prompter.say("3. Copy the code shown on the page")?;
    prompter.prompt("4. Paste the code here")
}

/// Line-oriented prompts: numbered lists and typed answers.
pub struct Console<R, W> {
    input: R,
    output: W,
}

impl Console<StdinLock<'static>, Stdout> {
    /// Console bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// End of input is an error.
    fn read_answer(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}: ", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(DriveError::Prompt(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for Console<R, W> {
    type Output = W;

    fn output(&mut self) -> &mut W {
        &mut self.output
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        self.read_answer(message)
    }

    fn choose(&mut self, message: &str, items: &[String]) -> Result<usize> {
        for (idx, item) in items.iter().enumerate() {
            self.say(format!("  {}. {}", idx + 1, item))?;
        }
        let answer = self.read_answer(&format!("{} (1-{})", message, items.len()))?;
        match answer.parse::<usize>() {
            Ok(n) if (1..=items.len()).contains(&n) => Ok(n - 1),
            _ => Err(DriveError::InvalidSelection(format!(
                "expected a number between 1 and {}, got {:?}",
                items.len(),
                answer
            ))),
        }
    }

    /// Typed keys are returned as-is, so callers decide what an unknown key means.
    fn pick(&mut self, message: &str, options: &[(&str, &str)]) -> Result<String> {
        self.say(message)?;
        for (key, label) in options {
            self.say(format!("  {}. {}", key, label))?;
        }
        self.read_answer("Choice")
    }
}

impl<R: BufRead, W: Write> CodePrompt for Console<R, W> {
    fn prompt_for_code(&mut self, auth_url: &str) -> Result<String> {
        show_authorization(self, auth_url)
    }
}

/// Interactive terminal prompts with arrow-key selection.
pub struct Terminal {
    out: Stdout,
}

impl Terminal {
    pub fn new() -> Self {
        Self { out: io::stdout() }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

fn interaction_error(e: dialoguer::Error) -> DriveError {
    DriveError::Prompt(io::Error::other(e))
}

impl Prompter for Terminal {
    type Output = Stdout;

    fn output(&mut self) -> &mut Stdout {
        &mut self.out
    }

    fn prompt(&mut self, message: &str) -> Result<String> {
        let answer: String = Input::new()
            .with_prompt(message)
            .allow_empty(true)
            .interact_text()
            .map_err(interaction_error)?;
        Ok(answer.trim().to_string())
    }

    fn choose(&mut self, message: &str, items: &[String]) -> Result<usize> {
        if items.is_empty() {
            return Err(DriveError::InvalidSelection("nothing to choose from".to_string()));
        }
        Select::new()
            .with_prompt(message)
            .items(items)
            .default(0)
            .interact()
            .map_err(interaction_error)
    }

    fn pick(&mut self, message: &str, options: &[(&str, &str)]) -> Result<String> {
        let labels: Vec<&str> = options.iter().map(|(_, label)| *label).collect();
        let idx = Select::new()
            .with_prompt(message)
            .items(&labels)
            .default(0)
            .interact()
            .map_err(interaction_error)?;
        Ok(options[idx].0.to_string())
    }
}

impl CodePrompt for Terminal {
    fn prompt_for_code(&mut self, auth_url: &str) -> Result<String> {
        show_authorization(self, auth_url)
    }
}
