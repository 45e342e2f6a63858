//! Interactive prompts
//!
//! When the session is not interactive (`--no-interaction` or no terminal)
//! every prompt returns its default without reading input.

use crate::generator::Preset;
use console::Term;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use std::io;

pub struct Prompt {
    term: Term,
    theme: ColorfulTheme,
    interactive: bool,
}

impl Prompt {
    pub fn new(interactive: bool) -> Self {
        let term = Term::stderr();
        let interactive = interactive && term.is_term();
        Self {
            term,
            theme: ColorfulTheme::default(),
            interactive,
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Free-text answer; empty input keeps `default`
    pub fn ask(&self, question: &str, default: &str) -> io::Result<String> {
        if !self.interactive {
            return Ok(default.to_string());
        }
        Input::<String>::with_theme(&self.theme)
            .with_prompt(question)
            .default(default.to_string())
            .interact_text_on(&self.term)
            .map_err(io::Error::other)
    }

    pub fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        if !self.interactive {
            return Ok(default);
        }
        Confirm::with_theme(&self.theme)
            .with_prompt(question)
            .default(default)
            .interact_on(&self.term)
            .map_err(io::Error::other)
    }

    /// Index of the chosen option
    pub fn choose(&self, question: &str, options: &[&str], default: usize) -> io::Result<usize> {
        if !self.interactive {
            return Ok(default);
        }
        Select::with_theme(&self.theme)
            .with_prompt(question)
            .items(options)
            .default(default)
            .interact_on(&self.term)
            .map_err(io::Error::other)
    }

    pub fn choose_preset(&self) -> io::Result<Preset> {
        let labels: Vec<&str> = Preset::ALL.iter().map(Preset::label).collect();
        let index = self.choose("Which preset do you want to use?", &labels, 0)?;
        Ok(Preset::ALL[index])
    }
}
