use crate::error::ScreeningError;
use crate::types::{GameResult, UserProfile};

/// Per-player key-value state for one screening visit. Kept in memory only.
#[derive(Debug, Clone, Default)]
pub struct SessionStorage {
    user_name: Option<String>,
    user_age: Option<u8>,
    game_results: Vec<GameResult>,
}

impl SessionStorage {
    pub fn begin(&mut self, profile: UserProfile) {
        log::info!("New screening visit for {} (age {})", profile.name, profile.age);
        self.user_name = Some(profile.name);
        self.user_age = Some(profile.age);
        self.game_results.clear();
    }

    pub fn profile(&self) -> Option<UserProfile> {
        Some(UserProfile {
            name: self.user_name.clone()?,
            age: self.user_age?,
        })
    }

    pub fn user_age(&self) -> Option<u8> {
        self.user_age
    }

    pub fn record_result(&mut self, result: GameResult) {
        match self
            .game_results
            .iter_mut()
            .find(|r| r.game_id == result.game_id)
        {
            Some(existing) => *existing = result,
            None => self.game_results.push(result),
        }
    }

    pub fn game_results(&self) -> &[GameResult] {
        &self.game_results
    }

    pub fn game_results_json(&self) -> Result<String, ScreeningError> {
        Ok(serde_json::to_string(&self.game_results)?)
    }

    pub fn restore_game_results(&mut self, json: &str) -> Result<(), ScreeningError> {
        self.game_results = serde_json::from_str(json)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
