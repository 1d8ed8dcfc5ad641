use screening_games_bot::config::AppConfig;
use screening_games_bot::diagnosis::HttpScreeningApi;
use screening_games_bot::{
    command_handler, load_passage_bank, load_question_banks, message_handler,
    recursive_callback_handler, BotState, Command,
};
use std::error::Error;
use std::sync::Arc;
use teloxide::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("No .env file loaded: {}", e);
    }
    pretty_env_logger::init();
    log::info!("Starting screening games bot...");

    let config = AppConfig::from_env()?;
    log::info!("Screening API at {}", config.api_base_url);

    // Initialize bot with token from environment
    let bot = Bot::from_env();

    let banks = load_question_banks(&config)?;
    log::info!(
        "Loaded {} questions and {} scenarios",
        banks.question_count(),
        banks.scenarios().len()
    );
    let passages = load_passage_bank(&config)?;
    log::info!("Loaded {} writing passages", passages.len());

    let api = Arc::new(HttpScreeningApi::new(&config)?);
    let state = Arc::new(BotState::new(config, banks, passages, api));

    let handler = dptree::entry()
        .branch(Update::filter_message().filter_command::<Command>().endpoint(
            |bot: Bot, msg: Message, cmd: Command, state: Arc<BotState>| async move {
                log::debug!("Command {:?} from chat {}", cmd, msg.chat.id);
                command_handler(bot, msg, cmd, state.clone()).await
            },
        ))
        .branch(recursive_callback_handler(state.clone()))
        .branch(message_handler(state.clone()));

    log::info!("Starting command dispatching...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
