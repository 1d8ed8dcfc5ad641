use crate::bank::QuestionBanks;
use crate::catalog::GameSpec;
use crate::config::AppConfig;
use crate::diagnosis::ScreeningApi;
use crate::engine::{CancelToken, GameSession};
use crate::error::ScreeningError;
use crate::scores::ScoreAggregator;
use crate::storage::SessionStorage;
use crate::types::{GameResult, GameSummary, UserProfile};
use crate::writing::{PassageBank, WritingPrompt, WritingSession, WritingStep};
use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;
use std::time::Duration;
use teloxide::types::MessageId;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::timeout;

const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ActiveGame {
    pub spec: &'static GameSpec,
    pub session: Arc<Mutex<GameSession>>,
    pub message_id: Option<MessageId>,
    pub ticker: Option<CancelToken>,
}

impl ActiveGame {
    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancel();
        }
    }
}

/// Everything one chat has accumulated during a screening visit.
#[derive(Default)]
pub struct Player {
    pub storage: SessionStorage,
    pub scores: Arc<ScoreAggregator>,
    pub active: Option<ActiveGame>,
    pub writing: Option<WritingSession>,
}

pub struct BotState {
    pub config: AppConfig,
    pub banks: QuestionBanks,
    pub passages: PassageBank,
    pub api: Arc<dyn ScreeningApi>,
    pub players: Mutex<HashMap<i64, Player>>,
}

impl BotState {
    pub fn new(
        config: AppConfig,
        banks: QuestionBanks,
        passages: PassageBank,
        api: Arc<dyn ScreeningApi>,
    ) -> Self {
        Self {
            config,
            banks,
            passages,
            api,
            players: Mutex::new(HashMap::new()),
        }
    }

    pub async fn acquire_players_lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<i64, Player>>, Box<dyn Error + Send + Sync>> {
        match timeout(LOCK_TIMEOUT, self.players.lock()).await {
            Ok(guard) => Ok(guard),
            Err(_) => {
                log::error!("Timeout while acquiring players lock");
                Err("Lock acquisition timeout".into())
            }
        }
    }

    /// Replaces the chat's active game with a fresh session in intro state.
    pub async fn open_game(
        &self,
        chat_id: i64,
        spec: &'static GameSpec,
    ) -> Result<Arc<Mutex<GameSession>>, ScreeningError> {
        let mut players = self.players.lock().await;
        let player = players.entry(chat_id).or_default();
        if let Some(mut previous) = player.active.take() {
            previous.stop_ticker();
            previous.session.lock().await.close();
        }

        let session = GameSession::for_game(spec, &self.banks, player.scores.clone())?;
        let session = Arc::new(Mutex::new(session));
        player.active = Some(ActiveGame {
            spec,
            session: session.clone(),
            message_id: None,
            ticker: None,
        });
        Ok(session)
    }

    pub async fn active_game(
        &self,
        chat_id: i64,
    ) -> Option<(&'static GameSpec, Arc<Mutex<GameSession>>)> {
        let players = self.players.lock().await;
        players
            .get(&chat_id)?
            .active
            .as_ref()
            .map(|active| (active.spec, active.session.clone()))
    }

    pub async fn set_question_message(&self, chat_id: i64, message_id: MessageId) {
        let mut players = self.players.lock().await;
        if let Some(active) = players.get_mut(&chat_id).and_then(|p| p.active.as_mut()) {
            active.message_id = Some(message_id);
        }
    }

    pub async fn question_message(&self, chat_id: i64) -> Option<MessageId> {
        let players = self.players.lock().await;
        players.get(&chat_id)?.active.as_ref()?.message_id
    }

    /// Installs a new ticker token for the current question, cancelling the old one.
    pub async fn replace_ticker(&self, chat_id: i64) -> CancelToken {
        let token = CancelToken::new();
        let mut players = self.players.lock().await;
        if let Some(active) = players.get_mut(&chat_id).and_then(|p| p.active.as_mut()) {
            active.stop_ticker();
            active.ticker = Some(token.clone());
        }
        token
    }

    pub async fn stop_ticker(&self, chat_id: i64) {
        let mut players = self.players.lock().await;
        if let Some(active) = players.get_mut(&chat_id).and_then(|p| p.active.as_mut()) {
            active.stop_ticker();
        }
    }

    /// Ends the active game. Scores already recorded are kept.
    pub async fn close_game(&self, chat_id: i64) -> bool {
        let active = {
            let mut players = self.players.lock().await;
            players.get_mut(&chat_id).and_then(|p| p.active.take())
        };
        match active {
            Some(mut active) => {
                active.stop_ticker();
                active.session.lock().await.close();
                log::info!("Closed {} for chat {}", active.spec.id, chat_id);
                true
            }
            None => false,
        }
    }

    /// Drops the active game only if it is still `session`.
    pub async fn release_game(&self, chat_id: i64, session: &Arc<Mutex<GameSession>>) {
        let mut players = self.players.lock().await;
        let Some(player) = players.get_mut(&chat_id) else {
            return;
        };
        let is_current = player
            .active
            .as_ref()
            .is_some_and(|active| Arc::ptr_eq(&active.session, session));
        if is_current {
            if let Some(mut active) = player.active.take() {
                active.stop_ticker();
            }
        }
    }

    pub async fn store_result(&self, chat_id: i64, spec: &GameSpec, summary: &GameSummary) {
        let mut players = self.players.lock().await;
        let player = players.entry(chat_id).or_default();
        player.storage.record_result(GameResult {
            game_id: summary.game_id.clone(),
            game_name: spec.name.to_string(),
            score: summary.score,
            total_questions: summary.total_questions,
            average_time: summary.average_time,
            completed: true,
        });
        match player.storage.game_results_json() {
            Ok(json) => log::debug!("Results for chat {}: {}", chat_id, json),
            Err(e) => log::warn!("Failed to serialize results: {}", e),
        }
    }

    pub async fn scores(&self, chat_id: i64) -> Arc<ScoreAggregator> {
        let mut players = self.players.lock().await;
        players.entry(chat_id).or_default().scores.clone()
    }

    pub async fn storage(&self, chat_id: i64) -> SessionStorage {
        let players = self.players.lock().await;
        players
            .get(&chat_id)
            .map(|p| p.storage.clone())
            .unwrap_or_default()
    }

    /// Starts a new visit: profile stored, previous results dropped.
    pub async fn begin_visit(&self, chat_id: i64, profile: UserProfile) {
        self.close_game(chat_id).await;
        let scores = {
            let mut players = self.players.lock().await;
            let player = players.entry(chat_id).or_default();
            player.storage.begin(profile);
            player.writing = None;
            player.scores.clone()
        };
        scores.reset().await;
    }

    /// Clears results and profile for the chat, as when a new child starts.
    pub async fn reset_player(&self, chat_id: i64) {
        self.close_game(chat_id).await;
        let scores = {
            let mut players = self.players.lock().await;
            let player = players.entry(chat_id).or_default();
            player.storage.clear();
            player.writing = None;
            player.scores.clone()
        };
        scores.reset().await;
    }

    /// Starts the copy-passage task over from the first era.
    pub async fn start_writing(&self, chat_id: i64, age: u8) -> Option<WritingPrompt> {
        let session = WritingSession::start(age, self.passages.len());
        let prompt = session.prompt(&self.passages);
        let mut players = self.players.lock().await;
        players.entry(chat_id).or_default().writing = Some(session);
        prompt
    }

    /// Marks the current passage as copied and returns the next one, if any.
    pub async fn complete_writing_era(
        &self,
        chat_id: i64,
    ) -> Result<(WritingStep, Option<WritingPrompt>), ScreeningError> {
        let mut players = self.players.lock().await;
        let session = players
            .get_mut(&chat_id)
            .and_then(|p| p.writing.as_mut())
            .ok_or(ScreeningError::InvalidTransition("no writing task in progress"))?;
        let step = session.complete_era()?;
        Ok((step, session.prompt(&self.passages)))
    }

    /// Handwriting photos are taken once every passage has been copied.
    pub async fn accepts_handwriting(&self, chat_id: i64) -> bool {
        let players = self.players.lock().await;
        players
            .get(&chat_id)
            .and_then(|p| p.writing.as_ref())
            .is_some_and(WritingSession::is_finished)
    }
}

pub fn load_question_banks(config: &AppConfig) -> Result<QuestionBanks, ScreeningError> {
    QuestionBanks::load(&config.questions_path, &config.scenarios_path)
}

pub fn load_passage_bank(config: &AppConfig) -> Result<PassageBank, ScreeningError> {
    PassageBank::load(&config.passages_path)
}
