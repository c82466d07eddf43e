//! Line-oriented front end: maps typed commands to user actions.

use thiserror::Error;

use crate::kernel::event::{PromptLanguage, UserAction};

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("unknown command '{0}' (try `help`)")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("unknown language '{0}' (use `original` or `en`)")]
    UnknownLanguage(String),
}

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Action(UserAction),
    /// Copy whatever rewrite the sidebar currently shows
    CopyShown,
    /// Insert whatever rewrite the sidebar currently shows
    InsertShown,
    Help,
}

pub const HELP: &str = "\
commands:
  analyze | reanalyze | toggle | close | manual | quit
  text <prompt>      set the prompt without analyzing
  submit <prompt>    manual entry: set and analyze
  copy [text]        copy the shown rewrite (or the given text)
  insert [text]      type the shown rewrite (or text) into the tracked app
  lang original|en   switch the rewrite language";

pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    let action = match head.to_ascii_lowercase().as_str() {
        "analyze" | "a" => UserAction::Analyze,
        "reanalyze" | "retry" => UserAction::Reanalyze,
        "toggle" | "t" => UserAction::ToggleSidebar,
        "close" => UserAction::CloseSidebar,
        "manual" | "m" => UserAction::OpenManual,
        "quit" | "q" | "exit" => UserAction::Quit,
        "text" => UserAction::SetPromptText(rest.to_string()),
        "submit" => {
            if rest.is_empty() {
                return Err(CommandError::MissingArgument("submit"));
            }
            UserAction::SubmitManual(rest.to_string())
        }
        "copy" => {
            if rest.is_empty() {
                return Ok(Command::CopyShown);
            }
            UserAction::ApplyFix(rest.to_string())
        }
        "insert" => {
            if rest.is_empty() {
                return Ok(Command::InsertShown);
            }
            UserAction::Insert(rest.to_string())
        }
        "lang" => match rest.to_ascii_lowercase().as_str() {
            "" => return Err(CommandError::MissingArgument("lang")),
            "original" | "ko" | "orig" => UserAction::SelectLanguage(PromptLanguage::Original),
            "en" | "english" => UserAction::SelectLanguage(PromptLanguage::English),
            other => return Err(CommandError::UnknownLanguage(other.to_string())),
        },
        "help" | "?" => return Ok(Command::Help),
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Command::Action(action))
}
