use crate::bank::{QuestionBank, Scenario};
use crate::engine::next_difficulty;
use crate::types::{Difficulty, Question};
use std::collections::HashMap;

pub const QUESTIONS_PER_SCENARIO: usize = 3;

/// Decides which question a session shows next.
pub trait QuestionPlan: Send + Sync {
    fn current(&self) -> Option<&Question>;

    fn total(&self) -> usize;

    /// Called once per answered question, before `advance`.
    fn record(&mut self, correct: bool);

    /// Moves to the next question. Returns false when the plan is exhausted.
    fn advance(&mut self) -> bool;

    fn reset(&mut self);

    fn difficulty(&self) -> Option<Difficulty> {
        None
    }

    fn difficulty_trail(&self) -> &[Difficulty] {
        &[]
    }

    /// Text introducing the current question group, if it just started.
    fn heading(&self) -> Option<String> {
        None
    }
}

pub struct LinearPlan {
    bank: QuestionBank,
    index: usize,
}

impl LinearPlan {
    pub fn new(bank: QuestionBank) -> Self {
        Self { bank, index: 0 }
    }
}

impl QuestionPlan for LinearPlan {
    fn current(&self) -> Option<&Question> {
        self.bank.get(self.index)
    }

    fn total(&self) -> usize {
        self.bank.len()
    }

    fn record(&mut self, _correct: bool) {}

    fn advance(&mut self) -> bool {
        if self.index + 1 < self.bank.len() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn reset(&mut self) {
        self.index = 0;
    }
}

/// Shop scenarios whose next question tier follows the last answer.
pub struct AdaptivePlan {
    scenarios: Vec<Scenario>,
    per_scenario: usize,
    scenario: usize,
    asked_in_scenario: usize,
    tier: Difficulty,
    next_tier: Option<Difficulty>,
    visits: HashMap<Difficulty, usize>,
    trail: Vec<Difficulty>,
}

impl AdaptivePlan {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self::with_questions_per_scenario(scenarios, QUESTIONS_PER_SCENARIO)
    }

    /// Scenarios missing a tier are skipped, so `current` always has a question while playing.
    pub fn with_questions_per_scenario(scenarios: Vec<Scenario>, per_scenario: usize) -> Self {
        let (scenarios, incomplete): (Vec<_>, Vec<_>) =
            scenarios.into_iter().partition(|s| s.tiers.is_complete());
        for scenario in &incomplete {
            log::warn!("Skipping scenario {}: some tiers have no questions", scenario.name);
        }
        Self {
            scenarios,
            per_scenario: per_scenario.max(1),
            scenario: 0,
            asked_in_scenario: 0,
            tier: Difficulty::Medium,
            next_tier: None,
            visits: HashMap::new(),
            trail: vec![Difficulty::Medium],
        }
    }

    pub fn scenario(&self) -> Option<&Scenario> {
        self.scenarios.get(self.scenario)
    }

    fn visits(&self, tier: Difficulty) -> usize {
        self.visits.get(&tier).copied().unwrap_or(0)
    }
}

impl QuestionPlan for AdaptivePlan {
    fn current(&self) -> Option<&Question> {
        self.scenario()?.tiers.pick(self.tier, self.visits(self.tier))
    }

    fn total(&self) -> usize {
        self.scenarios.len() * self.per_scenario
    }

    fn record(&mut self, correct: bool) {
        let next = next_difficulty(self.tier, correct);
        log::debug!("Difficulty {} -> {} (correct: {})", self.tier, next, correct);
        self.trail.push(next);
        self.next_tier = Some(next);
    }

    fn advance(&mut self) -> bool {
        *self.visits.entry(self.tier).or_insert(0) += 1;
        self.asked_in_scenario += 1;
        let next_tier = self.next_tier.take().unwrap_or(self.tier);

        if self.asked_in_scenario < self.per_scenario {
            self.tier = next_tier;
            return true;
        }

        if self.scenario + 1 >= self.scenarios.len() {
            return false;
        }
        self.scenario += 1;
        self.asked_in_scenario = 0;
        self.visits.clear();
        // every shop opens with a medium question
        self.tier = Difficulty::Medium;
        true
    }

    fn reset(&mut self) {
        self.scenario = 0;
        self.asked_in_scenario = 0;
        self.tier = Difficulty::Medium;
        self.next_tier = None;
        self.visits.clear();
        self.trail = vec![Difficulty::Medium];
    }

    fn difficulty(&self) -> Option<Difficulty> {
        Some(self.tier)
    }

    fn difficulty_trail(&self) -> &[Difficulty] {
        &self.trail
    }

    fn heading(&self) -> Option<String> {
        if self.asked_in_scenario != 0 {
            return None;
        }
        self.scenario()
            .map(|s| format!("{} {}\nLet me ask you some questions about my shop.", s.avatar, s.intro))
    }
}
