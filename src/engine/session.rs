use crate::bank::QuestionBanks;
use crate::catalog::{GameKind, GameSpec};
use crate::engine::{evaluate, AdaptivePlan, CancelToken, LinearPlan, MatchRule, QuestionPlan, QuestionTimer};
use crate::error::ScreeningError;
use crate::scores::ScoreAggregator;
use crate::types::{average_time, AnswerEvent, Difficulty, GameState, GameSummary, Question};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_ADVANCE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub game_id: String,
    pub game_name: String,
    pub advance_delay: Duration,
    pub match_rule: MatchRule,
}

impl GameConfig {
    pub fn new(game_id: impl Into<String>, game_name: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            game_name: game_name.into(),
            advance_delay: DEFAULT_ADVANCE_DELAY,
            match_rule: MatchRule::default(),
        }
    }

    pub fn advance_delay(mut self, delay: Duration) -> Self {
        self.advance_delay = delay;
        self
    }

    pub fn match_rule(mut self, rule: MatchRule) -> Self {
        self.match_rule = rule;
        self
    }
}

impl From<&GameSpec> for GameConfig {
    fn from(spec: &GameSpec) -> Self {
        GameConfig::new(spec.id, spec.name)
            .advance_delay(spec.advance_delay())
            .match_rule(spec.match_rule)
    }
}

#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Not playing, or an answer for this question is already pending.
    Ignored,
    Answered(AnswerEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    Next(usize),
    Finished(GameSummary),
}

/// One play-through of a mini-game: intro -> playing -> result.
pub struct GameSession {
    config: GameConfig,
    plan: Box<dyn QuestionPlan>,
    scores: Arc<ScoreAggregator>,
    state: GameState,
    index: usize,
    score: u32,
    events: Vec<AnswerEvent>,
    pending: bool,
    timer: QuestionTimer,
    lifetime: CancelToken,
}

impl GameSession {
    pub fn new(config: GameConfig, plan: Box<dyn QuestionPlan>, scores: Arc<ScoreAggregator>) -> Self {
        Self {
            config,
            plan,
            scores,
            state: GameState::Intro,
            index: 0,
            score: 0,
            events: Vec::new(),
            pending: false,
            timer: QuestionTimer::default(),
            lifetime: CancelToken::new(),
        }
    }

    pub fn for_game(
        spec: &GameSpec,
        banks: &QuestionBanks,
        scores: Arc<ScoreAggregator>,
    ) -> Result<Self, ScreeningError> {
        let plan: Box<dyn QuestionPlan> = match spec.kind {
            GameKind::Linear => Box::new(LinearPlan::new(banks.bank(spec.id)?.clone())),
            GameKind::Adaptive => Box::new(AdaptivePlan::new(banks.scenarios().to_vec())),
        };
        if plan.total() == 0 {
            return Err(ScreeningError::EmptyBank(spec.id.to_string()));
        }
        Ok(Self::new(GameConfig::from(spec), plan, scores))
    }

    pub fn start(&mut self) -> Result<&Question, ScreeningError> {
        if self.state != GameState::Intro {
            return Err(ScreeningError::InvalidTransition("start is only valid from intro"));
        }
        self.plan.reset();
        if self.plan.current().is_none() {
            return Err(ScreeningError::EmptyBank(self.config.game_id.clone()));
        }
        self.index = 0;
        self.score = 0;
        self.events.clear();
        self.pending = false;
        self.state = GameState::Playing;
        self.timer.start();
        log::info!("Started {} ({} questions)", self.config.game_id, self.plan.total());
        self.plan
            .current()
            .ok_or_else(|| ScreeningError::EmptyBank(self.config.game_id.clone()))
    }

    pub fn submit_answer(&mut self, answer: &str) -> SubmitOutcome {
        if self.state != GameState::Playing || self.pending {
            log::debug!("Ignoring answer for {}: nothing to answer", self.config.game_id);
            return SubmitOutcome::Ignored;
        }
        let question = match self.plan.current() {
            Some(question) => question.clone(),
            None => return SubmitOutcome::Ignored,
        };

        let time_taken_secs = self.timer.stop();
        let is_correct = evaluate(&question, answer, self.config.match_rule);
        self.plan.record(is_correct);
        if is_correct {
            self.score += 1;
        }

        let event = AnswerEvent {
            question,
            submitted_answer: answer.to_string(),
            is_correct,
            time_taken_secs,
            answered_at: Utc::now(),
        };
        log::debug!(
            "{} q{}: {:?} correct={} in {:.1}s",
            self.config.game_id,
            self.index + 1,
            event.submitted_answer,
            is_correct,
            time_taken_secs
        );
        self.events.push(event.clone());
        self.pending = true;
        SubmitOutcome::Answered(event)
    }

    /// Moves past the answered question. The summary is recorded before `Finished` is returned.
    pub async fn advance(&mut self) -> Result<Advance, ScreeningError> {
        if self.state != GameState::Playing || !self.pending {
            return Err(ScreeningError::InvalidTransition("advance needs a pending answer"));
        }
        self.pending = false;

        if self.plan.advance() {
            self.index += 1;
            self.timer.start();
            return Ok(Advance::Next(self.index));
        }

        self.state = GameState::Result;
        let summary = self.summary();
        self.scores.record(summary.clone()).await?;
        log::info!(
            "Finished {}: {}/{}",
            summary.game_id,
            summary.score,
            summary.total_questions
        );
        Ok(Advance::Finished(summary))
    }

    /// Back to intro. Tasks scheduled for the previous run are cancelled.
    pub fn restart(&mut self) {
        self.lifetime.cancel();
        self.lifetime = CancelToken::new();
        self.plan.reset();
        self.timer.reset();
        self.state = GameState::Intro;
        self.index = 0;
        self.score = 0;
        self.events.clear();
        self.pending = false;
    }

    /// Ends the session's lifetime without touching recorded scores.
    pub fn close(&mut self) {
        self.lifetime.cancel();
        self.timer.reset();
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            game_id: self.config.game_id.clone(),
            score: self.score,
            total_questions: self.plan.total() as u32,
            average_time: average_time(&self.events),
        }
    }

    pub fn lifetime(&self) -> CancelToken {
        self.lifetime.clone()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn total_questions(&self) -> usize {
        self.plan.total()
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.state {
            GameState::Playing => self.plan.current(),
            _ => None,
        }
    }

    pub fn events(&self) -> &[AnswerEvent] {
        &self.events
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Playing with the current question still unanswered.
    pub fn is_awaiting_answer(&self) -> bool {
        self.state == GameState::Playing && !self.pending
    }

    pub fn elapsed(&self) -> Duration {
        self.timer.elapsed()
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.plan.difficulty()
    }

    pub fn difficulty_trail(&self) -> &[Difficulty] {
        self.plan.difficulty_trail()
    }

    pub fn heading(&self) -> Option<String> {
        self.plan.heading()
    }
}
