//! Quiz definitions and the plain-text quiz file format.
//!
//! A quiz file is a sequence of blocks separated by any number of blank lines:
//!
//! ```text
//! mcq
//! 2+2?
//! 1
//! 2
//! 3
//! 4
//! D
//!
//! draw
//! Sketch a circle
//! ```
//!
//! Lines that do not start a block are skipped.

use std::fmt;
use std::path::Path;

use log::{info, warn};

use crate::error::QuizError;

pub const OPTION_COUNT: usize = 4;

/// Letter of a multiple-choice option, in display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [Self; OPTION_COUNT] = [Self::A, Self::B, Self::C, Self::D];

    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Parses a single letter, case-insensitively.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Self::A),
            "B" => Some(Self::B),
            "C" => Some(Self::C),
            "D" => Some(Self::D),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One quiz question. The kind is fixed once loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Question {
    MultipleChoice {
        prompt: String,
        options: [String; OPTION_COUNT],
        answer: OptionLetter,
    },
    Drawing {
        prompt: String,
    },
}

impl Question {
    pub fn prompt(&self) -> &str {
        match self {
            Self::MultipleChoice { prompt, .. } | Self::Drawing { prompt } => prompt,
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, Self::MultipleChoice { .. })
    }

    /// The correct letter, for multiple-choice questions.
    pub fn answer(&self) -> Option<OptionLetter> {
        match self {
            Self::MultipleChoice { answer, .. } => Some(*answer),
            Self::Drawing { .. } => None,
        }
    }
}

/// Loads and parses a quiz file.
///
/// # Errors
///
/// [`QuizError::QuizDefinition`] if the file cannot be read or a block is
/// malformed, [`QuizError::NoQuestions`] if it holds no question at all.
pub fn load_questions(path: &Path) -> Result<Vec<Question>, QuizError> {
    let text = std::fs::read_to_string(path).map_err(|err| QuizError::QuizDefinition {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    let questions = parse_questions(&text).map_err(|reason| QuizError::QuizDefinition {
        path: path.to_path_buf(),
        reason,
    })?;
    if questions.is_empty() {
        return Err(QuizError::NoQuestions {
            path: path.to_path_buf(),
        });
    }
    info!("Loaded {} questions from {}", questions.len(), path.display());
    Ok(questions)
}

/// Parses quiz text. The error string names the offending block.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut questions = Vec::new();
    let mut i = 0;
    while let Some(keyword) = lines.get(i) {
        match keyword.to_ascii_lowercase().as_str() {
            "mcq" => {
                let block = lines
                    .get(i + 1..i + 7)
                    .ok_or_else(|| format!("mcq block {} is truncated", questions.len() + 1))?;
                let [prompt, a, b, c, d, answer] = block else {
                    return Err(format!("mcq block {} is truncated", questions.len() + 1));
                };
                let answer = OptionLetter::parse(answer).ok_or_else(|| {
                    format!(
                        "mcq block {} has answer {answer:?}, expected one of A-D",
                        questions.len() + 1
                    )
                })?;
                questions.push(Question::MultipleChoice {
                    prompt: (*prompt).to_owned(),
                    options: [a, b, c, d].map(|option| (*option).to_owned()),
                    answer,
                });
                i += 7;
            }
            "draw" => {
                let prompt = lines
                    .get(i + 1)
                    .ok_or_else(|| format!("draw block {} has no prompt", questions.len() + 1))?;
                questions.push(Question::Drawing {
                    prompt: (*prompt).to_owned(),
                });
                i += 2;
            }
            _ => {
                warn!("Skipping unexpected quiz line: {keyword}");
                i += 1;
            }
        }
    }
    Ok(questions)
}
