use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

mod profile;
pub use profile::*;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Intro,
    Playing,
    Result,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub follow_up: String,
}

impl Question {
    pub fn is_free_text(&self) -> bool {
        self.options.is_empty()
    }
}

/// One submitted answer. Never mutated once pushed onto a session.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerEvent {
    pub question: Question,
    pub submitted_answer: String,
    pub is_correct: bool,
    pub time_taken_secs: f64,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub game_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub average_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub game_id: String,
    pub score: u32,
    pub total_questions: u32,
    pub average_time: Option<f64>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub recorded_at: DateTime<Utc>,
}

impl From<GameSummary> for ScoreRecord {
    fn from(summary: GameSummary) -> Self {
        ScoreRecord {
            game_id: summary.game_id,
            score: summary.score,
            total_questions: summary.total_questions,
            average_time: Some(summary.average_time),
            recorded_at: Utc::now(),
        }
    }
}

/// Mean of the recorded answer times, 0 when nothing was answered.
pub fn average_time(events: &[AnswerEvent]) -> f64 {
    if events.is_empty() {
        return 0.0;
    }
    let total: f64 = events.iter().map(|e| e.time_taken_secs).sum();
    total / events.len() as f64
}
