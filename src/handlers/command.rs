use crate::catalog::{available_games, first_game, playable_game, validate_age, GameSpec};
use crate::error::ScreeningError;
use crate::handlers::{announce_game, begin_writing};
use crate::report::Report;
use crate::types::UserProfile;
use crate::{BotState, Command};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start => {
            bot.send_message(
                chat_id,
                "
                \n 👋 Welcome to the math games!
                \n 🧒 First use /profile <name> <age> to tell me who is playing (ages 6 to 13).
                \n 🎮 Use /play to start the next game, or /games to see them all.
                \n 📊 Use /report to see the results so far and /diagnose for a screening summary.
                \n ✍️ Use /handwriting for the time travel writing task.
                \n ❓ Use /help for additional guidance.
                ",
            )
            .await?;
        }
        Command::Profile { name, age } => {
            let age = match validate_age(&age) {
                Ok(age) => age,
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                    return Ok(());
                }
            };
            let name = name.trim().to_string();
            if name.is_empty() {
                bot.send_message(chat_id, "Please enter both name and age").await?;
                return Ok(());
            }
            state.begin_visit(chat_id.0, UserProfile { name: name.clone(), age }).await;
            bot.send_message(
                chat_id,
                format!("Hi {}! You have {} games to play. Use /play to begin.", name, available_games(age).len()),
            )
            .await?;
        }
        Command::Play(requested) => {
            let Some(age) = state.storage(chat_id.0).await.user_age() else {
                bot.send_message(chat_id, "Please set a profile first: /profile <name> <age>")
                    .await?;
                return Ok(());
            };
            match pick_game(&state, chat_id.0, requested.trim(), age).await {
                Ok(Some(spec)) => announce_game(&bot, chat_id, &state, spec).await?,
                Ok(None) => {
                    bot.send_message(chat_id, "All games are done! Use /report to see the results.")
                        .await?;
                }
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
        Command::Games => {
            let storage = {
                let players = state.acquire_players_lock().await?;
                players
                    .get(&chat_id.0)
                    .map(|p| p.storage.clone())
                    .unwrap_or_default()
            };
            let Some(age) = storage.user_age() else {
                bot.send_message(chat_id, "Please set a profile first: /profile <name> <age>")
                    .await?;
                return Ok(());
            };
            let list = available_games(age)
                .iter()
                .enumerate()
                .map(|(i, game)| {
                    let done = storage.game_results().iter().any(|r| r.game_id == game.id);
                    let mark = if done { "✅" } else { "▫️" };
                    format!("{}. {} {} (/play {})", i + 1, mark, game.name, game.id)
                })
                .collect::<Vec<_>>()
                .join("\n");
            bot.send_message(chat_id, format!("🎲 Games:\n\n{}", list)).await?;
        }
        Command::Report => {
            let scores = state.scores(chat_id.0).await;
            match Report::build(&scores).await {
                Ok(report) => {
                    bot.send_message(chat_id, report.render()).await?;
                }
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        }
        Command::Diagnose => handle_diagnose(&bot, chat_id, &state).await?,
        Command::Handwriting => begin_writing(&bot, chat_id, &state).await?,
        Command::Reset => {
            state.reset_player(chat_id.0).await;
            bot.send_message(chat_id, "Everything was cleared. Use /profile to start again.")
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, Command::descriptions().to_string())
                .await?;
        }
    }
    Ok(())
}

/// The named game, or the first available one not played yet.
async fn pick_game(
    state: &Arc<BotState>,
    chat_id: i64,
    requested: &str,
    age: u8,
) -> Result<Option<&'static GameSpec>, ScreeningError> {
    if !requested.is_empty() {
        return playable_game(requested, age).map(Some);
    }

    let storage = state.storage(chat_id).await;
    if storage.game_results().is_empty() {
        return Ok(first_game(age));
    }
    Ok(available_games(age)
        .into_iter()
        .find(|game| !storage.game_results().iter().any(|r| r.game_id == game.id)))
}

pub async fn handle_diagnose(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(age) = state.storage(chat_id.0).await.user_age() else {
        bot.send_message(chat_id, "Please set a profile first: /profile <name> <age>")
            .await?;
        return Ok(());
    };
    let scores = state.scores(chat_id.0).await;
    let report = match Report::build(&scores).await {
        Ok(report) => report,
        Err(e) => {
            bot.send_message(chat_id, e.user_message()).await?;
            return Ok(());
        }
    };
    if !report.can_diagnose() {
        bot.send_message(chat_id, "Play at least two games before asking for a summary.")
            .await?;
        return Ok(());
    }

    bot.send_message(
        chat_id,
        "⏳ Analyzing the results. This is not a medical diagnosis; please talk to a specialist about any concerns.",
    )
    .await?;
    match state.api.ask_math(&report.diagnosis_request(age)).await {
        Ok(reply) => {
            bot.send_message(chat_id, reply).await?;
        }
        Err(e) => {
            log::error!("Diagnosis failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    Ok(())
}
