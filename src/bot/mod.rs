mod active;

use std::sync::Arc;

use arabic_quiz::bank::Bank;
use log::info;
use teloxide::{
    dispatching::{dialogue::ErasedStorage, UpdateHandler},
    prelude::*,
    types::{KeyboardButton, KeyboardMarkup},
};

pub use active::{ActiveQuiz, Screen, Step};

pub type QuizDialogue = Dialogue<State, ErasedStorage<State>>;
pub type QuizStorage = Arc<ErasedStorage<State>>;
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
type HandlerResult = Result<(), HandlerError>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    ReceiveQuizChoice,
    Playing {
        quiz: ActiveQuiz,
    },
}

pub fn schema() -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .enter_dialogue::<Message, ErasedStorage<State>, State>()
        .branch(dptree::case![State::Start].endpoint(start))
        .branch(dptree::case![State::ReceiveQuizChoice].endpoint(receive_quiz_choice))
        .branch(dptree::case![State::Playing { quiz }].endpoint(play))
}

const GREETING_TEXT: &str = "أهلا وسهلا! Selamat datang di kuis bahasa Arab. Pilih kuis yang ingin kamu kerjakan:";

fn keyboard(rows: Vec<Vec<String>>) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.into_iter()
            .filter(|row| !row.is_empty())
            .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
            .collect::<Vec<_>>(),
    )
}

fn menu(bank: &Bank) -> KeyboardMarkup {
    keyboard(bank.titles().map(|title| vec![title.to_string()]).collect())
}

async fn show(bot: &Bot, chat: ChatId, quiz: &ActiveQuiz) -> HandlerResult {
    let Screen { text, buttons } = quiz.screen();
    bot.send_message(chat, text)
        .reply_markup(keyboard(buttons))
        .await?;
    Ok(())
}

async fn start(bot: Bot, dialogue: QuizDialogue, bank: Arc<Bank>, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(menu(&bank))
        .await?;

    dialogue.update(State::ReceiveQuizChoice).await?;
    Ok(())
}

async fn receive_quiz_choice(
    bot: Bot,
    dialogue: QuizDialogue,
    bank: Arc<Bank>,
    msg: Message,
) -> HandlerResult {
    let Some(definition) = msg.text().and_then(|title| bank.find(title)) else {
        bot.send_message(msg.chat.id, "Silakan pilih salah satu kuis dari daftar.")
            .reply_markup(menu(&bank))
            .await?;
        return Ok(());
    };

    let quiz = ActiveQuiz::start(definition, &mut rand::thread_rng());
    info!("Chat {} started quiz '{}'", msg.chat.id, quiz.title);
    show(&bot, msg.chat.id, &quiz).await?;

    dialogue.update(State::Playing { quiz }).await?;
    Ok(())
}

async fn play(
    bot: Bot,
    dialogue: QuizDialogue,
    bank: Arc<Bank>,
    mut quiz: ActiveQuiz,
    msg: Message,
) -> HandlerResult {
    let Some(input) = msg.text() else {
        bot.send_message(msg.chat.id, "Jawab dengan teks atau tombol ya.")
            .await?;
        return Ok(());
    };

    let was_submitted = quiz.is_submitted();
    let step = quiz.handle(input.trim(), &mut rand::thread_rng());
    match step {
        Step::Leave => {
            bot.send_message(msg.chat.id, "Pilih kuis berikutnya:")
                .reply_markup(menu(&bank))
                .await?;
            dialogue.update(State::ReceiveQuizChoice).await?;
            return Ok(());
        }
        Step::Stay(Some(notice)) => {
            bot.send_message(msg.chat.id, notice).await?;
        }
        Step::Stay(None) => {}
    }

    if !was_submitted && quiz.is_submitted() {
        info!("Chat {} finished quiz '{}'", msg.chat.id, quiz.title);
    }
    show(&bot, msg.chat.id, &quiz).await?;

    dialogue.update(State::Playing { quiz }).await?;
    Ok(())
}
