//! Persona and response-mode directives.

use serde::{Deserialize, Serialize};

/// How the assistant should shape its answer.
///
/// Unknown mode strings fall back to [`ChatMode::Quick`] rather than
/// erroring; mode is a stylistic hint, not a contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    #[default]
    Quick,
    Info,
    Guide,
}

impl ChatMode {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "info" => Self::Info,
            "guide" => Self::Guide,
            _ => Self::Quick,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Info => "info",
            Self::Guide => "guide",
        }
    }

    /// The style directive woven into the system prompt.
    pub fn directive(&self) -> &'static str {
        match self {
            Self::Quick => {
                "Answer in one or two sentences. Get straight to the point; skip preamble."
            }
            Self::Info => {
                "Give a thorough, factual answer. Include the relevant details from the \
                 school information provided, organized clearly."
            }
            Self::Guide => {
                "Walk the student through it step by step. Be encouraging and check that \
                 each step is actionable before moving to the next."
            }
        }
    }
}

/// The base persona block every prompt starts with.
pub fn persona() -> &'static str {
    "You are Briar, the school's assistant. You serve staff first, then parents, \
     then students. You answer questions about teachers, schedules, rooms, clubs, \
     events, and school policies using only the school information provided below. \
     If the information you need is not provided, say so plainly instead of \
     guessing; never invent names, dates, or rooms. Never share one student's \
     personal information with anyone else. Be friendly, concise, and \
     age-appropriate."
}
