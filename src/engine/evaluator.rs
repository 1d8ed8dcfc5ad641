use crate::types::Question;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchRule {
    /// Symbol and option answers, compared as-is after trimming.
    Exact,
    #[default]
    IgnoreCase,
}

pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

pub fn evaluate(question: &Question, submitted: &str, rule: MatchRule) -> bool {
    match rule {
        MatchRule::Exact => submitted.trim() == question.correct_answer.trim(),
        MatchRule::IgnoreCase => normalize(submitted) == normalize(&question.correct_answer),
    }
}
