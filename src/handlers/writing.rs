use crate::error::ScreeningError;
use crate::keyboard::writing_keyboard;
use crate::writing::{WritingPrompt, WritingStep, ERA_TIME_LIMIT};
use crate::BotState;
use std::error::Error;
use std::sync::Arc;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::PhotoSize;

const SAMPLE_FILE_NAME: &str = "handwriting.jpg";
const SAMPLE_MIME: &str = "image/jpeg";

/// Starts the copy task from the first era.
pub async fn begin_writing(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let Some(profile) = state.storage(chat_id.0).await.profile() else {
        bot.send_message(chat_id, "Please set a profile first: /profile <name> <age>")
            .await?;
        return Ok(());
    };
    match state.start_writing(chat_id.0, profile.age).await {
        Some(prompt) => {
            bot.send_message(
                chat_id,
                format!(
                    "✍️ Time travel writing, {}! Copy each passage onto paper, then tap the button below it.",
                    profile.name
                ),
            )
            .await?;
            send_passage(bot, chat_id, &prompt).await?;
        }
        None => {
            bot.send_message(chat_id, "There are no writing passages available right now.")
                .await?;
        }
    }
    Ok(())
}

pub async fn send_passage(
    bot: &Bot,
    chat_id: ChatId,
    prompt: &WritingPrompt,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    bot.send_message(
        chat_id,
        format!(
            "🕰 Era {}/{}: {}\n⏱ Try to finish in {} seconds.\n\n{}",
            prompt.number,
            prompt.total,
            prompt.era_name,
            ERA_TIME_LIMIT.as_secs(),
            prompt.passage
        ),
    )
    .reply_markup(writing_keyboard(prompt.is_last()))
    .await?;
    Ok(())
}

/// The child finished copying the current passage.
pub async fn next_passage(
    bot: &Bot,
    chat_id: ChatId,
    state: &Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    match state.complete_writing_era(chat_id.0).await {
        Ok((WritingStep::Next(_), Some(prompt))) => send_passage(bot, chat_id, &prompt).await?,
        Ok((WritingStep::Next(_), None)) => {
            log::warn!("Writing task for chat {} has no passage to show", chat_id);
        }
        Ok((WritingStep::Finished { early_completions }, _)) => {
            bot.send_message(
                chat_id,
                format!(
                    "🌟 All done! You finished {} of {} passages before the timer ran out.\n\n📷 Now send a clear photo of your writing and I will have it checked.",
                    early_completions,
                    state.passages.len()
                ),
            )
            .await?;
        }
        Err(ScreeningError::InvalidTransition(_)) => {
            bot.send_message(chat_id, "Use /handwriting to start the writing task.")
                .await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn handle_handwriting(
    bot: Bot,
    msg: Message,
    state: Arc<BotState>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let chat_id = msg.chat.id;
    let Some(age) = state.storage(chat_id.0).await.user_age() else {
        bot.send_message(chat_id, "Please set a profile first: /profile <name> <age>")
            .await?;
        return Ok(());
    };
    if !state.accepts_handwriting(chat_id.0).await {
        bot.send_message(chat_id, "Copy the passages first: use /handwriting to begin.")
            .await?;
        return Ok(());
    }
    // Telegram lists sizes smallest first
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    let image = match fetch_photo(&bot, photo).await {
        Ok(image) => image,
        Err(e) => {
            log::error!("Could not fetch photo for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message()).await?;
            return Ok(());
        }
    };

    bot.send_message(chat_id, "⏳ Checking the handwriting sample...").await?;
    match state
        .api
        .ask_handwriting(age, image, SAMPLE_FILE_NAME, SAMPLE_MIME)
        .await
    {
        Ok(reply) => {
            bot.send_message(chat_id, reply).await?;
        }
        Err(e) => {
            log::error!("Handwriting analysis failed for chat {}: {}", chat_id, e);
            bot.send_message(chat_id, e.user_message()).await?;
        }
    }
    Ok(())
}

async fn fetch_photo(bot: &Bot, photo: &PhotoSize) -> Result<Vec<u8>, ScreeningError> {
    let file = bot.get_file(&photo.file.id).await?;
    let mut image = Vec::new();
    bot.download_file(&file.path, &mut image).await?;
    Ok(image)
}
