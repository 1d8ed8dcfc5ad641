use crate::handlers::{handle_handwriting, submit_answer};
use crate::BotState;
use std::error::Error;
use std::sync::Arc;
use teloxide::dispatching::DpHandlerDescription;
use teloxide::prelude::*;

pub fn message_handler(
    state: Arc<BotState>,
) -> dptree::Handler<'static, DependencyMap, Result<(), Box<dyn Error + Send + Sync>>, DpHandlerDescription>
{
    Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state.clone();
        async move { handle_message(bot, msg, state).await }
    })
}

pub async fn handle_message(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if msg.photo().is_some() {
        return handle_handwriting(bot, msg, state).await;
    }
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let chat_id = msg.chat.id;

    let free_text = match state.active_game(chat_id.0).await {
        Some((_, session)) => session
            .lock()
            .await
            .current_question()
            .map(|q| q.is_free_text()),
        None => None,
    };
    match free_text {
        Some(true) if !text.trim().is_empty() => submit_answer(&bot, chat_id, &state, text).await?,
        Some(false) => {
            bot.send_message(chat_id, "Tap one of the answer buttons above 👆").await?;
        }
        _ => {
            bot.send_message(chat_id, "Use /help to see what I can do.").await?;
        }
    }
    Ok(())
}
