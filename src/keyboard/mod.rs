use crate::catalog::NextStep;
use crate::types::Question;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub const ANSWER_PREFIX: &str = "ans:";
pub const PLAY_PREFIX: &str = "play:";
pub const START_GAME: &str = "start_game";
pub const QUIT_GAME: &str = "quit_game";
pub const SHOW_REPORT: &str = "report";
pub const WRITING_DONE: &str = "writing_done";

fn quit_row() -> Vec<InlineKeyboardButton> {
    vec![InlineKeyboardButton::callback("🛑 Quit Game".to_string(), QUIT_GAME.to_string())]
}

pub fn create_keyboard(
    question: &Question,
    selected_answer: Option<&str>,
    show_correct: bool,
    show_end_button: bool,
) -> InlineKeyboardMarkup {
    let mut keyboard: Vec<Vec<InlineKeyboardButton>> = question
        .options
        .iter()
        .map(|option| {
            let mut text = option.clone();
            if show_correct {
                if option == &question.correct_answer {
                    text = format!("✅ {}", option);
                } else if selected_answer == Some(option.as_str()) {
                    text = format!("❌ {}", option);
                }
            }
            vec![InlineKeyboardButton::callback(text, format!("{}{}", ANSWER_PREFIX, option))]
        })
        .collect();

    if show_end_button {
        keyboard.push(quit_row());
    }

    InlineKeyboardMarkup::new(keyboard)
}

pub fn intro_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![InlineKeyboardButton::callback("▶️ Start".to_string(), START_GAME.to_string())],
        quit_row(),
    ])
}

pub fn result_keyboard(next: NextStep) -> InlineKeyboardMarkup {
    let button = match next {
        NextStep::Game(spec) => InlineKeyboardButton::callback(
            format!("➡️ Next: {}", spec.name),
            format!("{}{}", PLAY_PREFIX, spec.id),
        ),
        NextStep::Reports => {
            InlineKeyboardButton::callback("📊 See results".to_string(), SHOW_REPORT.to_string())
        }
    };
    InlineKeyboardMarkup::new(vec![vec![button]])
}

/// Shown under a copy passage. The last era gets a finish label.
pub fn writing_keyboard(last: bool) -> InlineKeyboardMarkup {
    let label = if last { "🏁 I'm done writing" } else { "➡️ Done, next era" };
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        label.to_string(),
        WRITING_DONE.to_string(),
    )]])
}
