use crate::catalog::{next_game, GameSpec};
use crate::engine::{schedule_advance, spawn_ticker, Advance, GameSession, SubmitOutcome};
use crate::error::ScreeningError;
use crate::keyboard::{create_keyboard, intro_keyboard, result_keyboard};
use crate::state::BotState;
use crate::types::{AnswerEvent, GameSummary};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use tokio::sync::Mutex;

/// Opens `spec` for the chat and shows its intro screen.
pub async fn announce_game(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    spec: &'static GameSpec,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let session = state.open_game(chat_id.0, spec).await?;
    let total = session.lock().await.total_questions();
    bot.send_message(
        chat_id,
        format!("🎮 {}\n{}\n\n{} questions. Ready?", spec.name, spec.description, total),
    )
    .reply_markup(intro_keyboard())
    .await?;
    Ok(())
}

/// intro -> playing for the chat's active game.
pub async fn begin_game(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some((_, session)) = state.active_game(chat_id.0).await else {
        bot.send_message(chat_id, "No game is open. Use /play to pick one.").await?;
        return Ok(());
    };

    let started = session.lock().await.start().map(|_| ());
    match started {
        Ok(()) => send_question(bot, chat_id, state, &session).await,
        Err(ScreeningError::InvalidTransition(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

pub async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    session: &Arc<Mutex<GameSession>>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let (question, heading, index, total, lifetime) = {
        let session = session.lock().await;
        let Some(question) = session.current_question().cloned() else {
            return Ok(());
        };
        (
            question,
            session.heading(),
            session.current_index(),
            session.total_questions(),
            session.lifetime(),
        )
    };

    if let Some(heading) = heading {
        bot.send_message(chat_id, heading).await?;
    }

    let mut text = format!("Question {}/{}\n\n{}", index + 1, total, question.prompt);
    if question.is_free_text() {
        text.push_str("\n\n✍️ Type your answer.");
    }
    let keyboard = create_keyboard(&question, None, false, true);
    let sent = bot
        .send_message(chat_id, text.clone())
        .reply_markup(keyboard.clone())
        .await?;
    state.set_question_message(chat_id.0, sent.id).await;

    let ticker = state.replace_ticker(chat_id.0).await;
    let message_id = sent.id;
    let bot = bot.clone();
    let session = session.clone();
    spawn_ticker(state.config.tick_interval, ticker.clone(), move |elapsed| {
        let bot = bot.clone();
        let text = text.clone();
        let keyboard = keyboard.clone();
        let lifetime = lifetime.clone();
        let ticker = ticker.clone();
        let session = session.clone();
        async move {
            // held through the edit so an answer's ✅/❌ markup always lands after it
            let current = session.lock().await;
            if lifetime.is_cancelled() || !current.is_awaiting_answer() {
                ticker.cancel();
                return;
            }
            let updated = format!("⏱ {}s\n{}", elapsed.as_secs(), text);
            if let Err(e) = bot
                .edit_message_text(chat_id, message_id, updated)
                .reply_markup(keyboard)
                .await
            {
                log::warn!("Failed to update timer for chat {}: {}", chat_id, e);
            }
            drop(current);
        }
    });
    Ok(())
}

/// Submits an answer to the chat's active game and schedules the move forward.
pub async fn submit_answer(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    answer: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some((spec, session)) = state.active_game(chat_id.0).await else {
        return Ok(());
    };

    let (outcome, lifetime) = {
        let mut session = session.lock().await;
        (session.submit_answer(answer), session.lifetime())
    };
    let event = match outcome {
        SubmitOutcome::Answered(event) => event,
        SubmitOutcome::Ignored => return Ok(()),
    };
    state.stop_ticker(chat_id.0).await;

    if !event.question.is_free_text() {
        if let Some(message_id) = state.question_message(chat_id.0).await {
            bot.edit_message_reply_markup(chat_id, message_id)
                .reply_markup(create_keyboard(
                    &event.question,
                    Some(&event.submitted_answer),
                    true,
                    false,
                ))
                .await?;
        }
    }
    bot.send_message(chat_id, feedback(&event)).await?;

    let bot = bot.clone();
    let state = state.clone();
    let advancing = session.clone();
    schedule_advance(session, lifetime, move |result| async move {
        let handled = match result {
            Ok(Advance::Next(_)) => send_question(&bot, chat_id, &state, &advancing).await,
            Ok(Advance::Finished(summary)) => {
                state.release_game(chat_id.0, &advancing).await;
                finish_game(&bot, chat_id, &state, spec, &summary).await
            }
            Err(e) => Err(e.into()),
        };
        if let Err(e) = handled {
            log::error!("Failed to advance {} for chat {}: {}", spec.id, chat_id, e);
        }
    });
    Ok(())
}

pub async fn finish_game(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
    spec: &'static GameSpec,
    summary: &GameSummary,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    state.store_result(chat_id.0, spec, summary).await;

    let age = state.storage(chat_id.0).await.user_age().unwrap_or(0);
    let cheer = if summary.score == summary.total_questions { "🎉 " } else { "" };
    bot.send_message(
        chat_id,
        format!(
            "{}🏁 {} complete!\nScore: {}/{}\nAverage time: {:.1}s",
            cheer, spec.name, summary.score, summary.total_questions, summary.average_time
        ),
    )
    .reply_markup(result_keyboard(next_game(spec.id, age)))
    .await?;
    Ok(())
}

fn feedback(event: &AnswerEvent) -> String {
    let follow_up = event.question.follow_up.trim();
    if event.is_correct {
        format!("🎉 Correct! {}", follow_up)
    } else {
        format!(
            "❌ Not quite. The answer is {}. {}",
            event.question.correct_answer, follow_up
        )
    }
}
