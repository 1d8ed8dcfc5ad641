use crate::types::Difficulty;

pub fn next_difficulty(current: Difficulty, was_correct: bool) -> Difficulty {
    match (current, was_correct) {
        (Difficulty::Medium, true) => Difficulty::Hard,
        (Difficulty::Medium, false) => Difficulty::Easy,
        (Difficulty::Easy, true) => Difficulty::Medium,
        (Difficulty::Easy, false) => Difficulty::Easy,
        (Difficulty::Hard, true) => Difficulty::Hard,
        (Difficulty::Hard, false) => Difficulty::Medium,
    }
}
