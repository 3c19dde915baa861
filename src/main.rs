mod bot;

use std::sync::Arc;

use arabic_quiz::{bank::Bank, config::Config};
use bot::{HandlerError, QuizStorage, State};
use teloxide::{
    dispatching::dialogue::{InMemStorage, Storage},
    prelude::*,
};

#[tokio::main]
async fn main() -> Result<(), HandlerError> {
    // .env has to be read before the logger looks at RUST_LOG
    let config = Config::from_env();
    pretty_env_logger::init();
    let config = config?;
    log::info!("Starting quiz bot...");

    let bank = Arc::new(Bank::load(&config.bank_path)?);
    let bot = Bot::new(config.token);
    let storage: QuizStorage = InMemStorage::<State>::new().erase();

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![storage, bank])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
    Ok(())
}
