use crate::engine::QuestionTimer;
use crate::error::ScreeningError;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Children up to this age copy the shorter passages.
pub const YOUNGER_MAX_AGE: u8 = 9;

/// Copying an era's passage within this time counts as an early finish.
pub const ERA_TIME_LIMIT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeTier {
    Younger,
    Older,
}

impl AgeTier {
    pub fn for_age(age: u8) -> Self {
        if age <= YOUNGER_MAX_AGE {
            AgeTier::Younger
        } else {
            AgeTier::Older
        }
    }
}

#[derive(Debug, Deserialize)]
struct PassageRow {
    era: String,
    tier: AgeTier,
    passage: String,
}

#[derive(Debug, Clone)]
pub struct Era {
    pub name: String,
    younger: Option<String>,
    older: Option<String>,
}

impl Era {
    pub fn passage(&self, tier: AgeTier) -> Option<&str> {
        match tier {
            AgeTier::Younger => self.younger.as_deref(),
            AgeTier::Older => self.older.as_deref(),
        }
    }
}

/// Copy passages grouped by era, in file order.
#[derive(Debug, Clone, Default)]
pub struct PassageBank {
    eras: Vec<Era>,
}

impl PassageBank {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScreeningError> {
        Self::from_csv(csv::Reader::from_path(path)?)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ScreeningError> {
        Self::from_csv(csv::Reader::from_reader(reader))
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, ScreeningError> {
        let mut eras: Vec<Era> = Vec::new();
        for result in reader.deserialize() {
            let row: PassageRow = result?;
            let index = match eras.iter().position(|e| e.name == row.era) {
                Some(index) => index,
                None => {
                    eras.push(Era {
                        name: row.era,
                        younger: None,
                        older: None,
                    });
                    eras.len() - 1
                }
            };
            let era = &mut eras[index];
            match row.tier {
                AgeTier::Younger => era.younger = Some(row.passage),
                AgeTier::Older => era.older = Some(row.passage),
            }
        }

        for era in &eras {
            if era.younger.is_none() || era.older.is_none() {
                return Err(ScreeningError::IncompleteBank(format!(
                    "era {} needs both a younger and an older passage",
                    era.name
                )));
            }
        }
        Ok(Self { eras })
    }

    pub fn len(&self) -> usize {
        self.eras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eras.is_empty()
    }

    pub fn era(&self, index: usize) -> Option<&Era> {
        self.eras.get(index)
    }

    /// The passage a child of `age` copies for era `index`.
    pub fn prompt(&self, index: usize, age: u8) -> Option<WritingPrompt> {
        let era = self.eras.get(index)?;
        Some(WritingPrompt {
            era_name: era.name.clone(),
            number: index + 1,
            total: self.eras.len(),
            passage: era.passage(AgeTier::for_age(age))?.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WritingPrompt {
    pub era_name: String,
    pub number: usize,
    pub total: usize,
    pub passage: String,
}

impl WritingPrompt {
    pub fn is_last(&self) -> bool {
        self.number == self.total
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritingStep {
    Next(usize),
    Finished { early_completions: u32 },
}

/// A child's walk through the eras, copying one passage at a time.
/// Handwriting photos are accepted once every era is done.
#[derive(Debug)]
pub struct WritingSession {
    age: u8,
    era: usize,
    eras: usize,
    early_completions: u32,
    finished: bool,
    timer: QuestionTimer,
}

impl WritingSession {
    pub fn start(age: u8, eras: usize) -> Self {
        let mut timer = QuestionTimer::default();
        timer.start();
        log::info!("Writing task started for age {} ({} eras)", age, eras);
        Self {
            age,
            era: 0,
            eras,
            early_completions: 0,
            finished: eras == 0,
            timer,
        }
    }

    pub fn tier(&self) -> AgeTier {
        AgeTier::for_age(self.age)
    }

    /// Index of the era being copied, `None` once all are done.
    pub fn era_index(&self) -> Option<usize> {
        (!self.finished).then_some(self.era)
    }

    pub fn prompt(&self, bank: &PassageBank) -> Option<WritingPrompt> {
        bank.prompt(self.era_index()?, self.age)
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn early_completions(&self) -> u32 {
        self.early_completions
    }

    pub fn complete_era(&mut self) -> Result<WritingStep, ScreeningError> {
        if self.finished {
            return Err(ScreeningError::InvalidTransition("every passage is already copied"));
        }
        let elapsed = self.timer.stop();
        if elapsed < ERA_TIME_LIMIT.as_secs_f64() {
            self.early_completions += 1;
        }
        log::debug!("Era {} copied in {:.1}s", self.era + 1, elapsed);

        if self.era + 1 < self.eras {
            self.era += 1;
            self.timer.start();
            return Ok(WritingStep::Next(self.era));
        }
        self.finished = true;
        Ok(WritingStep::Finished {
            early_completions: self.early_completions,
        })
    }
}
