use crate::commands::dispatcher::CommandDispatcher;
use crate::core::error::ChatError;

use console::style;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::FileHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, Context, EditMode, Editor, Helper};
use std::path::{Path, PathBuf};

fn command_candidates(names: &[String], prefix: &str) -> Vec<Pair> {
    names
        .iter()
        .filter(|name| name.starts_with(prefix))
        .map(|name| Pair {
            display: format!("/{}", name),
            replacement: name.to_string(),
        })
        .collect()
}

/// Completer and hinter for the chat prompt. Slash commands complete
/// from the registry; plain queries only get history hints.
pub struct ChatHelper {
    dispatcher: CommandDispatcher,
    hinter: HistoryHinter,
}

impl ChatHelper {
    pub fn new(dispatcher: CommandDispatcher) -> Self {
        Self {
            dispatcher,
            hinter: HistoryHinter {},
        }
    }
}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if line.starts_with('/') {
            if let Some(command_part) = line.get(1..pos) {
                let matches =
                    command_candidates(&self.dispatcher.get_command_names(), command_part);
                if !matches.is_empty() {
                    // 1 is the position after '/'
                    return Ok((1, matches));
                }
            }
        }
        Ok((pos, Vec::new()))
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ChatHelper {}

impl Validator for ChatHelper {}

impl Helper for ChatHelper {}

fn history_path() -> PathBuf {
    dirs::home_dir()
        .map(|mut path| {
            path.push(".natter/input_history.txt");
            path
        })
        .unwrap_or_else(|| Path::new(".natter/input_history.txt").to_path_buf())
}

/// Creates a configured rustyline editor
pub fn create_editor(
    dispatcher: CommandDispatcher,
) -> Result<Editor<ChatHelper, FileHistory>, ChatError> {
    let config = Config::builder()
        .history_ignore_space(true)
        .completion_type(CompletionType::List)
        .edit_mode(EditMode::Emacs)
        .build();

    let mut editor = Editor::with_config(config)
        .map_err(|e| ChatError::Input(format!("Failed to create line editor: {}", e)))?;
    editor.set_helper(Some(ChatHelper::new(dispatcher)));

    let _ = editor.load_history(&history_path());

    Ok(editor)
}

/// Reads one line of input. `None` means the user asked to leave with
/// Ctrl-C or Ctrl-D.
pub fn read_input(
    editor: &mut Editor<ChatHelper, FileHistory>,
) -> Result<Option<String>, ChatError> {
    let prompt = if cfg!(windows) && std::env::var("PSModulePath").is_ok() {
        "> ".to_string()
    } else {
        style("> ").bold().cyan().to_string()
    };
    match editor.readline(&prompt) {
        Ok(line) => {
            if !line.trim().is_empty() {
                editor.add_history_entry(&line).map_err(|e| {
                    ChatError::Input(format!("Failed to add history entry: {}", e))
                })?;
            }
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(ChatError::Input(format!("Input error: {}", err))),
    }
}

/// Saves the editor history
pub fn save_history(editor: &mut Editor<ChatHelper, FileHistory>) -> Result<(), ChatError> {
    let path = history_path();

    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ChatError::Input(format!("Failed to create history directory: {}", e))
            })?;
        }
    }

    editor
        .save_history(&path)
        .map_err(|e| ChatError::Input(format!("Failed to save history: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        ["help", "quit", "temperature"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn candidates_match_by_prefix() {
        let matches = command_candidates(&names(), "te");
        let replacements: Vec<&str> = matches.iter().map(|p| p.replacement.as_str()).collect();
        assert_eq!(replacements, vec!["temperature"]);
    }

    #[test]
    fn empty_prefix_offers_everything() {
        assert_eq!(command_candidates(&names(), "").len(), 3);
    }

    #[test]
    fn unmatched_prefix_offers_nothing() {
        assert!(command_candidates(&names(), "zz").is_empty());
    }
}
