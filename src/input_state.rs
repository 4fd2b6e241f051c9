//! Input state for message composition, history, and tab completion.

use crate::commands::LOCAL_COMMANDS;
use crate::validation::MAX_MESSAGE_CHARS;

/// State of the compose line.
///
/// The cursor is always at the end of the text; editing is append and
/// backspace only.
#[derive(Default, Debug)]
pub struct InputState {
    /// Current message being composed
    pub message_input: String,

    /// Submitted lines (for up/down arrow navigation)
    pub history: Vec<String>,

    /// Current position in history (None = not navigating)
    pub history_pos: Option<usize>,

    /// Saved input when entering history mode
    pub history_saved_input: Option<String>,

    /// Tab completion candidates
    pub completions: Vec<String>,

    /// Current completion index (for cycling through completions)
    pub completion_index: Option<usize>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(history: Vec<String>) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.message_input.is_empty()
    }

    /// Append a character unless the line is already full.
    pub fn insert_char(&mut self, c: char) {
        if self.message_input.chars().count() >= MAX_MESSAGE_CHARS {
            return;
        }
        self.message_input.push(c);
        self.reset_completion();
    }

    pub fn backspace(&mut self) {
        self.message_input.pop();
        self.reset_completion();
    }

    /// Take the composed line, recording it in history. Returns None for a
    /// blank line.
    pub fn take_submission(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.message_input);
        self.history_pos = None;
        self.history_saved_input = None;
        self.reset_completion();
        if text.trim().is_empty() {
            return None;
        }
        if self.history.last() != Some(&text) {
            self.history.push(text.clone());
        }
        Some(text)
    }

    /// Collect tab completion candidates for `prefix`: local commands when
    /// it starts with `/`, otherwise names of people in the room.
    pub fn collect_completions(&self, prefix: &str, authors: &[&str]) -> Vec<String> {
        if prefix.is_empty() {
            return Vec::new();
        }
        let mut matches: Vec<String> = if prefix.starts_with('/') {
            LOCAL_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(prefix))
                .map(|cmd| cmd.to_string())
                .collect()
        } else {
            let (lead, search) = match prefix.strip_prefix('@') {
                Some(stripped) => ("@", stripped),
                None => ("", prefix),
            };
            authors
                .iter()
                .filter(|name| name.starts_with(search))
                .map(|name| format!("{}{}", lead, name))
                .collect()
        };
        matches.sort();
        matches.dedup();
        matches
    }

    /// Replace the last word with `completion`. Commands get a space,
    /// a name at the start of the line gets ": ".
    pub fn apply_completion(&mut self, completion: &str, last_word_start: usize) {
        let is_first_token = self.message_input[..last_word_start].trim().is_empty();
        let suffix = if completion.starts_with('/') || !is_first_token {
            " "
        } else {
            ": "
        };
        let before = &self.message_input[..last_word_start];
        self.message_input = format!("{}{}{}", before, completion, suffix);
        self.history_pos = None;
        self.history_saved_input = None;
    }

    /// Start of the word being completed.
    pub fn current_last_word_start(&self) -> usize {
        self.message_input
            .rfind(char::is_whitespace)
            .map_or(0, |i| i + 1)
    }

    /// Complete the last word, cycling through candidates on repeated
    /// presses. Returns true if a completion was applied.
    pub fn complete(&mut self, authors: &[&str]) -> bool {
        if let Some(idx) = self.completion_index {
            if self.completions.is_empty() {
                return false;
            }
            let next_idx = (idx + 1) % self.completions.len();
            self.completion_index = Some(next_idx);
            let comp = self.completions[next_idx].clone();
            // the previous completion left a suffix; strip it before replacing
            let trimmed = self.message_input.trim_end_matches([' ', ':']).len();
            self.message_input.truncate(trimmed);
            let start = self.current_last_word_start();
            self.apply_completion(&comp, start);
            return true;
        }

        let start = self.current_last_word_start();
        let prefix = self.message_input[start..].to_string();
        self.completions = self.collect_completions(&prefix, authors);
        let Some(comp) = self.completions.first().cloned() else {
            return false;
        };
        self.completion_index = Some(0);
        self.apply_completion(&comp, start);
        true
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
    }

    /// Navigate up in history.
    pub fn history_up(&mut self) {
        if self.history.is_empty() {
            return;
        }

        if self.history_pos.is_none() {
            // Store current text to restore if user navigates back
            self.history_saved_input = Some(self.message_input.clone());
            self.history_pos = Some(self.history.len() - 1);
        } else if let Some(pos) = self.history_pos {
            if pos > 0 {
                self.history_pos = Some(pos - 1);
            }
        }

        if let Some(pos) = self.history_pos {
            if let Some(h) = self.history.get(pos) {
                self.message_input = h.clone();
            }
        }
    }

    /// Navigate down in history.
    pub fn history_down(&mut self) {
        if let Some(pos) = self.history_pos {
            if pos + 1 < self.history.len() {
                self.history_pos = Some(pos + 1);
                if let Some(h) = self.history.get(pos + 1) {
                    self.message_input = h.clone();
                }
            } else {
                // Exit history navigation
                self.history_pos = None;
                self.message_input = self.history_saved_input.take().unwrap_or_default();
            }
        }
    }
}
