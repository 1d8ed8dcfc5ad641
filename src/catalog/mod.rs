use crate::engine::MatchRule;
use crate::error::ScreeningError;
use std::time::Duration;

pub const MIN_AGE: u8 = 6;
pub const MAX_AGE: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    Linear,
    Adaptive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSpec {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub min_age: u8,
    pub advance_delay_ms: u64,
    pub match_rule: MatchRule,
    pub kind: GameKind,
}

impl GameSpec {
    pub fn advance_delay(&self) -> Duration {
        Duration::from_millis(self.advance_delay_ms)
    }

    pub fn is_available_for(&self, age: u8) -> bool {
        age >= self.min_age
    }
}

pub const GAMES: &[GameSpec] = &[
    GameSpec {
        id: "dot-counting",
        name: "Dot Counting Game",
        description: "Recognize quantities without counting",
        min_age: 0,
        advance_delay_ms: 1500,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "number-comparison",
        name: "Number Comparison Game",
        description: "Judge greater vs smaller quantities",
        min_age: 0,
        advance_delay_ms: 1200,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "pattern-completion",
        name: "Pattern Completion Game",
        description: "Detect logical/memory issues via sequences",
        min_age: 0,
        advance_delay_ms: 3000,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "symbol-confusion",
        name: "Symbol Confusion Game",
        description: "Test symbol recognition",
        min_age: 0,
        advance_delay_ms: 1500,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "clock-reading",
        name: "Clock Reading Game",
        description: "Read analog clocks and calculate time",
        min_age: 0,
        advance_delay_ms: 2000,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "place-value",
        name: "Place Value Puzzle",
        description: "Evaluate understanding of number structure",
        min_age: 0,
        advance_delay_ms: 1500,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "word-problem",
        name: "Basic Word Problem Game",
        description: "Apply math to real-life situations",
        min_age: 8,
        advance_delay_ms: 1500,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
    GameSpec {
        id: "conversational",
        name: "Conversational Math Game",
        description: "Simulate real-life math via dialogue",
        min_age: 10,
        advance_delay_ms: 2500,
        match_rule: MatchRule::IgnoreCase,
        kind: GameKind::Adaptive,
    },
    GameSpec {
        id: "multi-step",
        name: "Multi-Step Problem Game",
        description: "Solve problems that need more than one step",
        min_age: 10,
        advance_delay_ms: 3000,
        match_rule: MatchRule::Exact,
        kind: GameKind::Linear,
    },
];

pub fn find_game(id: &str) -> Result<&'static GameSpec, ScreeningError> {
    GAMES
        .iter()
        .find(|g| g.id == id)
        .ok_or_else(|| ScreeningError::UnknownGame(id.to_string()))
}

/// Looks up a game the child is old enough to play.
pub fn playable_game(id: &str, age: u8) -> Result<&'static GameSpec, ScreeningError> {
    let spec = find_game(id)?;
    if !spec.is_available_for(age) {
        return Err(ScreeningError::AgeRestricted {
            game: spec.name,
            min_age: spec.min_age,
        });
    }
    Ok(spec)
}

/// Position in the play order, used to sort reports.
pub fn game_position(id: &str) -> Option<usize> {
    GAMES.iter().position(|g| g.id == id)
}

pub fn available_games(age: u8) -> Vec<&'static GameSpec> {
    GAMES.iter().filter(|g| g.is_available_for(age)).collect()
}

pub fn first_game(age: u8) -> Option<&'static GameSpec> {
    GAMES.iter().find(|g| g.is_available_for(age))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    Game(&'static GameSpec),
    Reports,
}

pub fn next_game(current: &str, age: u8) -> NextStep {
    let games = available_games(age);
    match games.iter().position(|g| g.id == current) {
        Some(index) if index + 1 < games.len() => NextStep::Game(games[index + 1]),
        _ => NextStep::Reports,
    }
}

pub fn validate_age(input: &str) -> Result<u8, ScreeningError> {
    let invalid = || {
        ScreeningError::InvalidAge(format!(
            "Please enter a valid age between {} and {}",
            MIN_AGE, MAX_AGE
        ))
    };
    let age: u8 = input.trim().parse().map_err(|_| invalid())?;
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(invalid());
    }
    Ok(age)
}
