use crate::error::ScreeningError;
use crate::types::{GameSummary, ScoreRecord};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Cross-game score store. One record per game, last write wins.
#[derive(Debug, Default)]
pub struct ScoreAggregator {
    records: Mutex<HashMap<String, ScoreRecord>>,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, summary: GameSummary) -> Result<(), ScreeningError> {
        if summary.score > summary.total_questions {
            return Err(ScreeningError::InvalidScore {
                game_id: summary.game_id,
                score: summary.score,
                total: summary.total_questions,
            });
        }
        let record = ScoreRecord::from(summary);
        log::info!(
            "Recording {}: {}/{} (avg {:.1}s)",
            record.game_id,
            record.score,
            record.total_questions,
            record.average_time.unwrap_or(0.0)
        );
        let mut records = self.records.lock().await;
        records.insert(record.game_id.clone(), record);
        Ok(())
    }

    pub async fn get(&self, game_id: &str) -> Option<ScoreRecord> {
        self.records.lock().await.get(game_id).cloned()
    }

    pub async fn all(&self) -> HashMap<String, ScoreRecord> {
        self.records.lock().await.clone()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn reset(&self) {
        self.records.lock().await.clear();
    }
}
