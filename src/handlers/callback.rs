use crate::catalog::playable_game;
use crate::handlers::{announce_game, begin_game, next_passage, submit_answer};
use crate::keyboard::{
    ANSWER_PREFIX, PLAY_PREFIX, QUIT_GAME, SHOW_REPORT, START_GAME, WRITING_DONE,
};
use crate::report::Report;
use crate::BotState;
use std::error::Error;
use std::sync::Arc;
use teloxide::dispatching::DpHandlerDescription;
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;

pub fn recursive_callback_handler(
    state: Arc<BotState>,
) -> dptree::Handler<'static, DependencyMap, Result<(), Box<dyn Error + Send + Sync>>, DpHandlerDescription>
{
    Update::filter_callback_query()
        .endpoint(move |bot: Bot, q: CallbackQuery| {
            let state = state.clone();
            async move {
                handle_callback_query(bot, q, state).await
            }
        })
}

pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let (Some(message), Some(data)) = (query.message, query.data) {
        let chat_id = message.chat.id;

        if data == QUIT_GAME {
            if state.close_game(chat_id.0).await {
                bot.send_message(chat_id, "Game stopped. Use /play when you want to try again.")
                    .await?;
            }
        } else if data == START_GAME {
            begin_game(&bot, chat_id, &state).await?;
        } else if data == WRITING_DONE {
            next_passage(&bot, chat_id, &state).await?;
        } else if data == SHOW_REPORT {
            let scores = state.scores(chat_id.0).await;
            let text = match Report::build(&scores).await {
                Ok(report) => report.render(),
                Err(e) => e.user_message(),
            };
            bot.send_message(chat_id, text).await?;
        } else if let Some(game_id) = data.strip_prefix(PLAY_PREFIX) {
            let age = state.storage(chat_id.0).await.user_age().unwrap_or(0);
            match playable_game(game_id, age) {
                Ok(spec) => announce_game(&bot, chat_id, &state, spec).await?,
                Err(e) => {
                    bot.send_message(chat_id, e.user_message()).await?;
                }
            }
        } else if let Some(answer) = data.strip_prefix(ANSWER_PREFIX) {
            submit_answer(&bot, chat_id, &state, answer).await?;
        } else {
            log::warn!("Unknown callback data: {}", data);
        }

        bot.answer_callback_query(query.id).await?;
    }
    Ok(())
}
