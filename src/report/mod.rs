use crate::catalog::{find_game, game_position};
use crate::error::ScreeningError;
use crate::scores::ScoreAggregator;
use crate::types::ScoreRecord;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameScore {
    pub game: String,
    pub correct: u32,
    pub total: u32,
}

/// Body of the `/askmath` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub age: String,
    pub scores: Vec<GameScore>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub game_id: String,
    pub game_name: String,
    pub score: u32,
    pub total_questions: u32,
    pub average_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub total_score: u32,
    pub total_possible: u32,
}

impl Report {
    /// Fails with `NoResults` when nothing has been played yet.
    pub async fn build(scores: &ScoreAggregator) -> Result<Self, ScreeningError> {
        let records = scores.all().await;
        if records.is_empty() {
            return Err(ScreeningError::NoResults);
        }

        let mut records: Vec<ScoreRecord> = records.into_values().collect();
        records.sort_by(|a, b| {
            let pa = game_position(&a.game_id).unwrap_or(usize::MAX);
            let pb = game_position(&b.game_id).unwrap_or(usize::MAX);
            pa.cmp(&pb).then_with(|| a.game_id.cmp(&b.game_id))
        });

        let rows: Vec<ReportRow> = records
            .into_iter()
            .map(|r| ReportRow {
                game_name: display_name(&r.game_id),
                game_id: r.game_id,
                score: r.score,
                total_questions: r.total_questions,
                average_time: r.average_time,
            })
            .collect();

        // Each game contributes its own question count.
        let total_score = rows.iter().map(|r| r.score).sum();
        let total_possible = rows.iter().map(|r| r.total_questions).sum();

        Ok(Self {
            rows,
            total_score,
            total_possible,
        })
    }

    pub fn diagnosis_request(&self, age: u8) -> DiagnosisRequest {
        DiagnosisRequest {
            age: age.to_string(),
            scores: self
                .rows
                .iter()
                .map(|r| GameScore {
                    game: r.game_name.clone(),
                    correct: r.score,
                    total: r.total_questions,
                })
                .collect(),
        }
    }

    /// Diagnosis is only offered once at least two games are in.
    pub fn can_diagnose(&self) -> bool {
        self.rows.len() >= 2
    }

    pub fn render(&self) -> String {
        let mut lines = vec!["📊 Assessment Results".to_string(), String::new()];
        for row in &self.rows {
            let time = row
                .average_time
                .map(|t| format!(" (avg {:.1}s)", t))
                .unwrap_or_default();
            lines.push(format!(
                "{}: {}/{}{}",
                row.game_name, row.score, row.total_questions, time
            ));
        }
        lines.push(String::new());
        lines.push(format!("Total: {}/{}", self.total_score, self.total_possible));
        lines.join("\n")
    }
}

fn display_name(game_id: &str) -> String {
    find_game(game_id)
        .map(|g| g.name.to_string())
        .unwrap_or_else(|_| game_id.to_string())
}
