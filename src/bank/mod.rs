use crate::error::ScreeningError;
use crate::types::{Difficulty, Question};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

const OPTION_SEPARATOR: char = '|';

#[derive(Debug, Deserialize)]
struct QuestionRow {
    game_id: String,
    prompt: String,
    options: String,
    correct_answer: String,
    difficulty: Option<Difficulty>,
    follow_up: String,
}

#[derive(Debug, Deserialize)]
struct ScenarioRow {
    scenario: String,
    avatar: String,
    intro: String,
    difficulty: Difficulty,
    question: String,
    answer: String,
    follow_up: String,
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        let options = row
            .options
            .split(OPTION_SEPARATOR)
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        Question {
            prompt: row.prompt,
            options,
            correct_answer: row.correct_answer,
            difficulty: row.difficulty.unwrap_or_default(),
            follow_up: row.follow_up,
        }
    }
}

/// Ordered, read-only list of questions for one game.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

/// Questions grouped by difficulty tier. Picking wraps around each tier.
#[derive(Debug, Clone, Default)]
pub struct TieredBank {
    tiers: HashMap<Difficulty, Vec<Question>>,
}

impl TieredBank {
    pub fn push(&mut self, question: Question) {
        self.tiers.entry(question.difficulty).or_default().push(question);
    }

    pub fn pick(&self, tier: Difficulty, visit: usize) -> Option<&Question> {
        let questions = self.tiers.get(&tier)?;
        if questions.is_empty() {
            return None;
        }
        questions.get(visit % questions.len())
    }

    pub fn tier_len(&self, tier: Difficulty) -> usize {
        self.tiers.get(&tier).map_or(0, Vec::len)
    }

    /// True when every tier has at least one question.
    pub fn is_complete(&self) -> bool {
        self.missing_tier().is_none()
    }

    pub fn missing_tier(&self) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|tier| self.tier_len(*tier) == 0)
    }
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub avatar: String,
    pub intro: String,
    pub tiers: TieredBank,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionBanks {
    banks: HashMap<String, QuestionBank>,
    scenarios: Vec<Scenario>,
}

impl QuestionBanks {
    pub fn load(
        questions_path: impl AsRef<Path>,
        scenarios_path: impl AsRef<Path>,
    ) -> Result<Self, ScreeningError> {
        let questions = csv::Reader::from_path(questions_path)?;
        let scenarios = csv::Reader::from_path(scenarios_path)?;
        Self::from_csv(questions, scenarios)
    }

    pub fn from_readers<Q: Read, S: Read>(questions: Q, scenarios: S) -> Result<Self, ScreeningError> {
        Self::from_csv(csv::Reader::from_reader(questions), csv::Reader::from_reader(scenarios))
    }

    fn from_csv<Q: Read, S: Read>(
        mut questions: csv::Reader<Q>,
        mut scenarios: csv::Reader<S>,
    ) -> Result<Self, ScreeningError> {
        let mut banks: HashMap<String, Vec<Question>> = HashMap::new();
        for result in questions.deserialize() {
            let row: QuestionRow = result?;
            banks.entry(row.game_id.clone()).or_default().push(row.into());
        }

        let mut grouped: Vec<Scenario> = Vec::new();
        for result in scenarios.deserialize() {
            let row: ScenarioRow = result?;
            let question = Question {
                prompt: row.question,
                options: Vec::new(),
                correct_answer: row.answer,
                difficulty: row.difficulty,
                follow_up: row.follow_up,
            };
            match grouped.iter_mut().find(|s| s.name == row.scenario) {
                Some(scenario) => scenario.tiers.push(question),
                None => {
                    let mut tiers = TieredBank::default();
                    tiers.push(question);
                    grouped.push(Scenario {
                        name: row.scenario,
                        avatar: row.avatar,
                        intro: row.intro,
                        tiers,
                    });
                }
            }
        }

        // the adaptive selector may move to any tier, so every tier must be answerable
        for scenario in &grouped {
            if let Some(tier) = scenario.tiers.missing_tier() {
                return Err(ScreeningError::IncompleteBank(format!(
                    "scenario {} has no {} questions",
                    scenario.name, tier
                )));
            }
        }

        Ok(Self {
            banks: banks
                .into_iter()
                .map(|(id, questions)| (id, QuestionBank::new(questions)))
                .collect(),
            scenarios: grouped,
        })
    }

    pub fn bank(&self, game_id: &str) -> Result<&QuestionBank, ScreeningError> {
        self.banks
            .get(game_id)
            .ok_or_else(|| ScreeningError::UnknownGame(game_id.to_string()))
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn question_count(&self) -> usize {
        self.banks.values().map(QuestionBank::len).sum()
    }
}
