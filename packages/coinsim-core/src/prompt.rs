//! Interactive prompts with reprompt-until-valid loops.
//!
//! [`Prompt`] reads from any `BufRead` and writes to any `Write`, so the CLI
//! hands it stdin/stdout and tests hand it byte buffers.

use crate::{Error, Result};
use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};

const INVALID_NUMBER: &str = "Please enter a valid number.";
const NOT_POSITIVE: &str = "Please enter a positive number.";
const INVALID_ANSWER: &str = "Please input valid answer(yes/no or y/n)";

pub struct Prompt<R, W> {
    reader: R,
    writer: W,
}

impl Prompt<BufReader<Stdin>, Stdout> {
    /// Prompt on the process terminal.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Ask for a non-negative amount.
    pub fn amount(&mut self, message: &str) -> Result<f64> {
        self.number(message, false)
    }

    /// Ask for a strictly positive quantity.
    pub fn quantity(&mut self, message: &str) -> Result<f64> {
        self.number(message, true)
    }

    /// Ask a yes/no question.
    pub fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            let answer = self.ask(question)?;
            match answer.trim().to_lowercase().as_str() {
                "yes" | "y" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => self.say(INVALID_ANSWER)?,
            }
        }
    }

    /// Print a line to the prompt's output.
    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn number(&mut self, message: &str, reject_zero: bool) -> Result<f64> {
        loop {
            let answer = self.ask(message)?;
            let cleaned: String = answer.chars().filter(|c| !c.is_whitespace()).collect();

            match cleaned.parse::<f64>() {
                Ok(value) if !value.is_finite() => self.say(INVALID_NUMBER)?,
                Ok(value) if value < 0.0 || (reject_zero && value == 0.0) => {
                    self.say(NOT_POSITIVE)?
                }
                Ok(value) => return Ok(value),
                Err(_) => self.say(INVALID_NUMBER)?,
            }
        }
    }

    fn ask(&mut self, message: &str) -> Result<String> {
        write!(self.writer, "{message}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(Error::InputClosed);
        }
        Ok(line)
    }
}
