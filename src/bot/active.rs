//! A quiz being played in one chat: the session of the right kind, how its
//! current page is shown as text plus reply-keyboard buttons, and how a
//! pressed button feeds back into the session.

use std::collections::BTreeSet;

use arabic_quiz::bank::{QuizContent, QuizDefinition};
use arabic_quiz::quiz::choice::{self, ChoiceQuestion, MultiSelect, MultipleChoice, OptionMark};
use arabic_quiz::quiz::fill_blank::FillBlank;
use arabic_quiz::quiz::harakat::{self, Harakat};
use arabic_quiz::quiz::irab::{self, IrabWord, Slot, SlotAnswer};
use arabic_quiz::quiz::matching::MatchingBoard;
use arabic_quiz::quiz::scramble::{self, SentenceScramble};
use arabic_quiz::quiz::true_false::TrueFalse;
use arabic_quiz::quiz::word_id::{WordIdentification, WordMark};
use arabic_quiz::quiz::written_expression::WrittenExpression;
use arabic_quiz::quiz::{QuestionId, QuizItem, Session, Submission, Verdict};
use log::debug;
use rand::Rng;

pub const PREVIOUS: &str = "⬅️ Sebelumnya";
pub const NEXT: &str = "Berikutnya ➡️";
pub const CHECK: &str = "🔍 Periksa";
pub const SUBMIT: &str = "📨 Kirim Jawaban";
pub const RESET: &str = "🔄 Ulangi";
pub const MENU: &str = "🏠 Menu";
pub const UNDO: &str = "↩️ Hapus";
pub const TRUE: &str = "Benar";
pub const FALSE: &str = "Salah";

/// What the chat should show next.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub text: String,
    pub buttons: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Stay in the quiz, optionally telling the learner why nothing happened.
    Stay(Option<&'static str>),
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Previous,
    Next,
    Check,
    Submit,
    Reset,
}

impl Control {
    fn parse(input: &str) -> Option<Self> {
        match input {
            PREVIOUS => Some(Control::Previous),
            NEXT => Some(Control::Next),
            CHECK => Some(Control::Check),
            SUBMIT => Some(Control::Submit),
            RESET => Some(Control::Reset),
            _ => None,
        }
    }

    fn refusal(self) -> &'static str {
        match self {
            Control::Previous => "Ini sudah soal pertama.",
            Control::Next => "Selesaikan soal ini terlebih dahulu.",
            Control::Check => "Lengkapi jawaban sebelum diperiksa.",
            Control::Submit => "Jawab semua soal terlebih dahulu.",
            Control::Reset => "Kuis belum selesai.",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Board {
    MultipleChoice(Session<MultipleChoice>),
    MultiSelect(Session<MultiSelect>),
    TrueFalse(Session<TrueFalse>),
    FillBlank(Session<FillBlank>),
    Scramble(Session<SentenceScramble>),
    Harakat(Session<Harakat>),
    Irab(Session<IrabWord>),
    WordId(Session<WordIdentification>),
    /// `held` is the item picked up and waiting for a target.
    Matching {
        session: Session<MatchingBoard>,
        held: Option<String>,
    },
    Written(Session<WrittenExpression>),
}

macro_rules! each_session {
    ($board:expr, $session:ident => $body:expr) => {
        match $board {
            Board::MultipleChoice($session) => $body,
            Board::MultiSelect($session) => $body,
            Board::TrueFalse($session) => $body,
            Board::FillBlank($session) => $body,
            Board::Scramble($session) => $body,
            Board::Harakat($session) => $body,
            Board::Irab($session) => $body,
            Board::WordId($session) => $body,
            Board::Matching { session: $session, .. } => $body,
            Board::Written($session) => $body,
        }
    };
}

#[derive(Debug, Clone)]
pub struct ActiveQuiz {
    pub title: String,
    pub board: Board,
}

impl ActiveQuiz {
    pub fn start<R: Rng + ?Sized>(definition: &QuizDefinition, rng: &mut R) -> Self {
        let shuffle = definition.shuffle_questions;
        let board = match &definition.content {
            QuizContent::MultipleChoice { questions } => {
                Board::MultipleChoice(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::MultiSelect { questions } => {
                Board::MultiSelect(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::TrueFalse { questions } => {
                Board::TrueFalse(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::FillInTheBlank { questions } => {
                Board::FillBlank(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::SentenceScramble { questions } => {
                Board::Scramble(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::Harakat { questions } => {
                Board::Harakat(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::IrabAnalysis { sentences } => Board::Irab(irab::session(sentences.clone(), rng)),
            QuizContent::WordIdentification { questions } => {
                Board::WordId(Session::new(questions.clone(), shuffle, rng))
            }
            QuizContent::Matching(board) => Board::Matching {
                session: Session::new(vec![board.clone()], false, rng),
                held: None,
            },
            QuizContent::WrittenExpression { questions } => {
                Board::Written(Session::new(questions.clone(), shuffle, rng))
            }
        };
        Self {
            title: definition.title.clone(),
            board,
        }
    }

    pub fn is_submitted(&self) -> bool {
        each_session!(&self.board, session => session.is_submitted())
    }

    /// Applies one pressed button or typed message.
    pub fn handle<R: Rng + ?Sized>(&mut self, input: &str, rng: &mut R) -> Step {
        if input == MENU {
            return Step::Leave;
        }
        if let Some(control) = Control::parse(input) {
            if let Board::Matching { held, .. } = &mut self.board {
                *held = None;
            }
            let done = each_session!(&mut self.board, session => apply_control(session, control, rng));
            return Step::Stay((!done).then(|| control.refusal()));
        }
        if self.is_submitted() {
            return Step::Stay(Some("Kuis sudah selesai. Tekan Ulangi untuk mencoba lagi."));
        }
        if self.answer(input) {
            Step::Stay(None)
        } else {
            debug!("input '{}' not accepted in quiz '{}'", input, self.title);
            Step::Stay(Some("Gunakan tombol yang tersedia."))
        }
    }

    fn answer(&mut self, input: &str) -> bool {
        match &mut self.board {
            Board::MultipleChoice(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let picked = session.response(question.id()).copied();
                let labels = choice_labels(question, |index| picked == Some(index));
                let Some(original) = position_of(&labels, input).and_then(|p| question.original_index(p))
                else {
                    return false;
                };
                let id = question.id().clone();
                session.answer(&id, original) && advance_quietly(session)
            }
            Board::MultiSelect(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let picked = session.response(question.id()).cloned().unwrap_or_default();
                let labels = choice_labels(question, |index| picked.contains(&index));
                let Some(original) = position_of(&labels, input).and_then(|p| question.original_index(p))
                else {
                    return false;
                };
                let id = question.id().clone();
                session.update(&id, |selection| choice::toggle(selection, original))
            }
            Board::TrueFalse(session) => {
                let value = match input {
                    TRUE => true,
                    FALSE => false,
                    _ => return false,
                };
                let Some(id) = focus(session).map(|q| q.id().clone()) else {
                    return false;
                };
                session.answer(&id, value) && advance_quietly(session)
            }
            Board::FillBlank(session) => {
                let Some(id) = focus(session).map(|q| q.id().clone()) else {
                    return false;
                };
                session.answer(&id, input.to_string()) && advance_quietly(session)
            }
            Board::Scramble(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let id = question.id().clone();
                if input == UNDO {
                    return session.update(&id, |arrangement| {
                        arrangement.pop();
                    });
                }
                let arrangement = session.response(&id).cloned().unwrap_or_default();
                let remaining = question.remaining(&arrangement);
                let labels: Vec<String> = remaining.iter().map(|tile| tile.item.clone()).collect();
                let Some(index) = position_of(&labels, input).map(|p| remaining[p].original_index) else {
                    return false;
                };
                session.update(&id, |arrangement| scramble::place(arrangement, index))
            }
            Board::Harakat(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let id = question.id().clone();
                if input == UNDO {
                    return session.update(&id, |marks| marks.clear());
                }
                let marks = session.response(&id).cloned().unwrap_or_default();
                let Some(position) = question.question_positions().find(|p| !marks.contains_key(p)) else {
                    return false;
                };
                let offered = question.sentence[position].choices();
                if !offered.iter().any(|choice| choice.item == input) {
                    return false;
                }
                session.update(&id, |marks| harakat::choose(marks, position, input))
            }
            Board::Irab(session) => {
                let Some(word) = focus(session) else {
                    return false;
                };
                let id = word.id().clone();
                if input == UNDO {
                    return session.update(&id, |answer| *answer = SlotAnswer::default());
                }
                let answer = session.response(&id).cloned().unwrap_or_default();
                let Some(slot) = next_slot(&answer) else {
                    return false;
                };
                if !word.options.get(slot).iter().any(|option| option == input) {
                    return false;
                }
                session.update(&id, |answer| answer.set(slot, input))
            }
            Board::WordId(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let selection = session.response(question.id()).cloned().unwrap_or_default();
                let labels = word_labels(question, &selection);
                let Some(index) = labels.iter().find(|(_, label)| label == input).map(|(i, _)| *i) else {
                    return false;
                };
                let id = question.id().clone();
                session.update(&id, |selection| choice::toggle(selection, index))
            }
            Board::Matching { session, held } => {
                let Some(board) = focus(session) else {
                    return false;
                };
                let id = board.id().clone();
                match held.take() {
                    None => {
                        let labels: Vec<String> = board.dealt_items().iter().map(|i| i.text.clone()).collect();
                        let Some(position) = position_of(&labels, input) else {
                            return false;
                        };
                        *held = Some(board.dealt_items()[position].id.clone());
                        true
                    }
                    Some(item) if input == UNDO => session.update(&id, |placement| placement.unplace(&item)),
                    Some(item) => {
                        let labels: Vec<String> = board.dealt_targets().iter().map(|t| t.text.clone()).collect();
                        let Some(position) = position_of(&labels, input) else {
                            *held = Some(item);
                            return false;
                        };
                        let target = board.dealt_targets()[position].id.clone();
                        session.update(&id, |placement| placement.place(&item, &target))
                    }
                }
            }
            Board::Written(session) => {
                let Some(question) = focus(session) else {
                    return false;
                };
                let Some(option) = question.options.iter().find(|option| option.text == input) else {
                    return false;
                };
                let (id, key) = (question.id().clone(), option.key.clone());
                session.answer(&id, key) && advance_quietly(session)
            }
        }
    }

    pub fn screen(&self) -> Screen {
        let mut text = format!("📘 {}\n", self.title);
        let mut buttons: Vec<Vec<String>> = Vec::new();
        if self.is_submitted() {
            text.push_str(&self.results());
        } else {
            text.push_str(&each_session!(&self.board, session => progress(session)));
            text.push('\n');
            text.push_str(&self.prompt());
            buttons.extend(self.answer_buttons().into_iter().map(|label| vec![label]));
        }
        let controls = each_session!(&self.board, session => control_row(session));
        buttons.push(controls.into_iter().map(str::to_string).collect());
        Screen { text, buttons }
    }

    fn prompt(&self) -> String {
        match &self.board {
            Board::MultipleChoice(session) => focus(session).map_or_else(String::new, |q| {
                let picked = session.response(q.id()).copied();
                choice_prompt(q, |index| picked == Some(index))
            }),
            Board::MultiSelect(session) => focus(session).map_or_else(String::new, |q| {
                let picked = session.response(q.id()).cloned().unwrap_or_default();
                format!(
                    "{}\n(Pilih semua jawaban yang benar)",
                    choice_prompt(q, |index| picked.contains(&index))
                )
            }),
            Board::TrueFalse(session) => focus(session).map_or_else(String::new, |q| {
                let mut text = q.question.clone();
                if let Some(answer) = session.response(q.id()) {
                    let verdict = q.evaluate(Some(answer));
                    text.push_str(&format!("\n{} {}", symbol(verdict), feedback_line(verdict, q.feedback.as_deref())));
                }
                text
            }),
            Board::FillBlank(session) => focus(session).map_or_else(String::new, |q| {
                let mut text = q.question.clone();
                if let Some(arabic) = &q.arabic_text {
                    text.push_str(&format!("\n{}", arabic));
                }
                if let Some(hint) = &q.hint {
                    text.push_str(&format!("\n💡 {}", hint));
                }
                let typed = session.response(q.id()).map_or("-", String::as_str);
                text.push_str(&format!("\nJawaban Anda: {}\n(Ketik jawaban Anda)", typed));
                text
            }),
            Board::Scramble(session) => focus(session).map_or_else(String::new, |q| {
                let arrangement = session.response(q.id()).cloned().unwrap_or_default();
                let mut text = q
                    .instruction
                    .clone()
                    .unwrap_or_else(|| "Susun kata-kata menjadi kalimat yang benar.".to_string());
                text.push_str(&format!("\n\n{}", q.sentence(&arrangement)));
                if session.is_checked(q.id()) {
                    let verdict = q.evaluate(Some(&arrangement));
                    text.push_str(&format!("\n{} {}", symbol(verdict), feedback_line(verdict, q.feedback.as_deref())));
                    if verdict != Verdict::Correct {
                        text.push_str(&format!("\nJawaban benar: {}", q.expected().unwrap_or_default()));
                    }
                }
                text
            }),
            Board::Harakat(session) => focus(session).map_or_else(String::new, |q| {
                let marks = session.response(q.id()).cloned().unwrap_or_default();
                let words: Vec<String> = q
                    .sentence
                    .iter()
                    .enumerate()
                    .map(|(position, word)| match marks.get(&position) {
                        Some(chosen) => chosen.clone(),
                        None if word.is_question => format!("[{}]", word.text),
                        None => word.text.clone(),
                    })
                    .collect();
                let mut text = q
                    .instruction
                    .clone()
                    .unwrap_or_else(|| "Pilih harakat yang tepat untuk kata dalam kurung.".to_string());
                text.push_str(&format!("\n\n{}", words.join(" ")));
                if session.is_checked(q.id()) {
                    for (position, right) in q.word_results(&marks) {
                        let correct = q.sentence[position].correct_answer.as_deref().unwrap_or_default();
                        text.push_str(&format!("\n{} {}", if right { "✅" } else { "❌" }, correct));
                    }
                }
                text
            }),
            Board::Irab(session) => irab_prompt(session),
            Board::WordId(session) => focus(session).map_or_else(String::new, |q| {
                let selection = session.response(q.id()).cloned().unwrap_or_default();
                let sentence: String = q.question_parts.iter().map(|p| p.text.as_str()).collect();
                let picked: Vec<&str> = selection
                    .iter()
                    .filter_map(|i| q.question_parts.get(*i))
                    .map(|p| p.text.as_str())
                    .collect();
                format!("{}\n\nTerpilih: {}", sentence, if picked.is_empty() { "-".to_string() } else { picked.join("، ") })
            }),
            Board::Matching { session, held } => focus(session).map_or_else(String::new, |board| {
                let placement = session.response(board.id()).cloned().unwrap_or_default();
                let mut text = board.instruction.clone().unwrap_or_else(|| "Pasangkan setiap kata.".to_string());
                for target in board.dealt_targets() {
                    let items: Vec<&str> = placement
                        .items_in(&target.id)
                        .iter()
                        .filter_map(|id| board.item(id))
                        .map(|item| item.text.as_str())
                        .collect();
                    text.push_str(&format!("\n▫️ {}: {}", target.text, items.join(", ")));
                }
                let pool: Vec<&str> = board.pool(&placement).iter().map(|item| item.text.as_str()).collect();
                text.push_str(&format!("\n📦 {}", if pool.is_empty() { "-".to_string() } else { pool.join(", ") }));
                match held.as_deref().and_then(|id| board.item(id)) {
                    Some(item) => text.push_str(&format!("\n\nPilih tempat untuk: {}", item.text)),
                    None => text.push_str("\n\nPilih kata yang ingin dipindahkan."),
                }
                text
            }),
            Board::Written(session) => focus(session).map_or_else(String::new, |q| {
                let chosen = session.response(q.id());
                let sentence: String = q
                    .parts()
                    .iter()
                    .map(|part| match &part.option_key {
                        Some(key) if chosen == Some(key) => format!("〔{}〕", part.text),
                        Some(_) => format!("[{}]", part.text),
                        None => part.text.clone(),
                    })
                    .collect();
                format!("Pilih bagian yang salah:\n\n{}", sentence)
            }),
        }
    }

    fn answer_buttons(&self) -> Vec<String> {
        match &self.board {
            Board::MultipleChoice(session) => focus(session).map_or_else(Vec::new, |q| {
                let picked = session.response(q.id()).copied();
                choice_labels(q, |index| picked == Some(index))
            }),
            Board::MultiSelect(session) => focus(session).map_or_else(Vec::new, |q| {
                let picked = session.response(q.id()).cloned().unwrap_or_default();
                choice_labels(q, |index| picked.contains(&index))
            }),
            Board::TrueFalse(session) => match focus(session) {
                Some(q) if !session.is_checked(q.id()) => vec![TRUE.to_string(), FALSE.to_string()],
                _ => Vec::new(),
            },
            Board::FillBlank(_) => Vec::new(),
            Board::Scramble(session) => match focus(session) {
                Some(q) if !session.is_checked(q.id()) => {
                    let arrangement = session.response(q.id()).cloned().unwrap_or_default();
                    let mut labels: Vec<String> =
                        q.remaining(&arrangement).into_iter().map(|tile| tile.item).collect();
                    if !arrangement.is_empty() {
                        labels.push(UNDO.to_string());
                    }
                    labels
                }
                _ => Vec::new(),
            },
            Board::Harakat(session) => match focus(session) {
                Some(q) if !session.is_checked(q.id()) => {
                    let marks = session.response(q.id()).cloned().unwrap_or_default();
                    let mut labels: Vec<String> = q
                        .question_positions()
                        .find(|p| !marks.contains_key(p))
                        .map(|p| q.sentence[p].choices().iter().map(|c| c.item.clone()).collect())
                        .unwrap_or_default();
                    if !marks.is_empty() {
                        labels.push(UNDO.to_string());
                    }
                    labels
                }
                _ => Vec::new(),
            },
            Board::Irab(session) => match focus(session) {
                Some(word) if !session.is_checked(word.id()) => {
                    let answer = session.response(word.id()).cloned().unwrap_or_default();
                    let mut labels: Vec<String> = next_slot(&answer)
                        .map(|slot| word.options.get(slot).to_vec())
                        .unwrap_or_default();
                    if answer != SlotAnswer::default() {
                        labels.push(UNDO.to_string());
                    }
                    labels
                }
                _ => Vec::new(),
            },
            Board::WordId(session) => focus(session).map_or_else(Vec::new, |q| {
                let selection = session.response(q.id()).cloned().unwrap_or_default();
                word_labels(q, &selection).into_iter().map(|(_, label)| label).collect()
            }),
            Board::Matching { session, held } => focus(session).map_or_else(Vec::new, |board| match held {
                None => board.dealt_items().iter().map(|item| item.text.clone()).collect(),
                Some(_) => {
                    let mut labels: Vec<String> =
                        board.dealt_targets().iter().map(|target| target.text.clone()).collect();
                    labels.push(UNDO.to_string());
                    labels
                }
            }),
            Board::Written(session) => focus(session).map_or_else(Vec::new, |q| {
                q.options.iter().map(|option| option.text.clone()).collect()
            }),
        }
    }

    fn results(&self) -> String {
        let (mut text, lines) = match &self.board {
            Board::MultipleChoice(session) => (summary(session), review(session, |q, answer| {
                let mark = answer.map_or(OptionMark::Neutral, |index| q.mark(*index, true));
                let correct: Vec<&str> = q.options.iter().filter(|o| o.is_correct).map(|o| o.text.as_str()).collect();
                match mark {
                    OptionMark::Correct => q.question.clone(),
                    _ => format!("{} → {}", q.question, correct.join(", ")),
                }
            })),
            Board::MultiSelect(session) => (summary(session), review(session, |q, _| {
                let correct: Vec<&str> = q.options.iter().filter(|o| o.is_correct).map(|o| o.text.as_str()).collect();
                format!("{} → {}", q.question, correct.join(", "))
            })),
            Board::TrueFalse(session) => (summary(session), review(session, |q, _| {
                format!("{} → {}", q.question, if q.correct_answer { TRUE } else { FALSE })
            })),
            Board::FillBlank(session) => (summary(session), review(session, |q, answer| {
                match answer {
                    Some(raw) if q.accepts(raw) => format!("{} → {}", q.question, raw.trim()),
                    _ => format!("{} → {}", q.question, q.expected().unwrap_or_default()),
                }
            })),
            Board::Scramble(session) => (summary(session), review(session, |q, _| {
                q.expected().unwrap_or_default().to_string()
            })),
            Board::Harakat(session) => (summary(session), review(session, |q, _| {
                q.sentence
                    .iter()
                    .map(|word| word.correct_answer.clone().unwrap_or_else(|| word.text.clone()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })),
            Board::Irab(session) => (summary(session), review(session, |word, answer| {
                let verdict = word.evaluate(answer);
                format!("{}: {}", word.text, word.feedback(verdict).unwrap_or_default())
            })),
            Board::WordId(session) => (summary(session), review(session, |q, answer| {
                let tally = q.tally(&answer.cloned().unwrap_or_default());
                let mut line = format!("Benar: {}, salah pilih: {}", tally.true_positives, tally.false_positives);
                if !tally.missed.is_empty() {
                    line.push_str(&format!(", terlewat: {}", tally.missed.join("، ")));
                }
                line
            })),
            Board::Matching { session, .. } => (summary(session), review(session, |board, answer| {
                let placement = answer.cloned().unwrap_or_default();
                board
                    .dealt_targets()
                    .iter()
                    .map(|target| {
                        let mark = if board.is_target_correct(&target.id, &placement) { "✅" } else { "❌" };
                        let expected: Vec<&str> = board
                            .items
                            .iter()
                            .filter(|item| item.match_id == target.id)
                            .map(|item| item.text.as_str())
                            .collect();
                        format!("\n   {} {}: {}", mark, target.text, expected.join(", "))
                    })
                    .collect()
            })),
            Board::Written(session) => (summary(session), review(session, |q, _| {
                let correct = q.option(&q.correct_answer_key).map_or("", |o| o.text.as_str());
                format!("Bagian yang salah: {}", correct)
            })),
        };
        text.push_str(&lines);
        text
    }
}

/// The question the learner is working on: first unchecked one of the page.
fn focus<Q: QuizItem>(session: &Session<Q>) -> Option<&Q> {
    let page = session.current_page()?;
    page.items
        .iter()
        .find(|item| !session.is_checked(item.id()))
        .or_else(|| page.items.first())
}

fn advance_quietly<Q: QuizItem>(session: &mut Session<Q>) -> bool {
    session.advance();
    true
}

fn apply_control<Q: QuizItem, R: Rng + ?Sized>(session: &mut Session<Q>, control: Control, rng: &mut R) -> bool {
    match control {
        Control::Previous => session.retreat(),
        Control::Next => session.advance(),
        Control::Check => {
            let id: Option<QuestionId> = focus(session).map(|item| item.id().clone());
            id.is_some_and(|id| session.check(&id))
        }
        Control::Submit => session.submit(),
        Control::Reset => session.reset(rng),
    }
}

fn control_row<Q: QuizItem>(session: &Session<Q>) -> Vec<&'static str> {
    let mut row = Vec::new();
    if session.can_retreat() {
        row.push(PREVIOUS);
    }
    if session.can_advance() {
        row.push(NEXT);
    }
    if session.policy().submission == Submission::PerQuestion {
        if let Some(item) = focus(session) {
            if !session.is_checked(item.id()) && session.is_complete(item.id()) {
                row.push(CHECK);
            }
        }
    }
    if session.can_submit() {
        row.push(SUBMIT);
    }
    if session.can_reset() {
        row.push(RESET);
    }
    row.push(MENU);
    row
}

fn progress<Q: QuizItem>(session: &Session<Q>) -> String {
    let current = session.current().map_or(0, |index| index + 1);
    let answered = session.view().questions.iter().filter(|q| q.answered).count();
    let mut text = format!(
        "Soal {}/{} · terjawab {}/{}\n",
        current,
        session.page_count(),
        answered,
        session.items().count()
    );
    if let Some(title) = session.current_page().and_then(|page| page.title.as_deref()) {
        text.push_str(&format!("{}\n", title));
    }
    text
}

fn summary<Q: QuizItem>(session: &Session<Q>) -> String {
    let score = session.score();
    format!("Skor: {} ({}%)\n{}\n", score, score.percentage(), score.band().message())
}

fn review<Q, F>(session: &Session<Q>, describe: F) -> String
where
    Q: QuizItem,
    F: Fn(&Q, Option<&Q::Response>) -> String,
{
    session
        .items()
        .enumerate()
        .map(|(index, item)| {
            let answer = session.response(item.id());
            format!("\n{}. {} {}", index + 1, symbol(item.evaluate(answer)), describe(item, answer))
        })
        .collect()
}

fn symbol(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Correct => "✅",
        Verdict::Incorrect => "❌",
        Verdict::Partial => "🟡",
        Verdict::Unanswered => "➖",
    }
}

fn feedback_line(verdict: Verdict, feedback: Option<&str>) -> String {
    let headline = if verdict.is_correct() { "Benar!" } else { "Kurang tepat." };
    match feedback {
        Some(feedback) => format!("{} {}", headline, feedback),
        None => headline.to_string(),
    }
}

fn position_of(labels: &[String], input: &str) -> Option<usize> {
    labels.iter().position(|label| label == input)
}

fn choice_label(text: &str, arabic: Option<&str>, selected: bool) -> String {
    let mut label = String::new();
    if selected {
        label.push_str("☑️ ");
    }
    label.push_str(text);
    if let Some(arabic) = arabic {
        label.push_str(&format!(" ({})", arabic));
    }
    label
}

fn choice_labels<F: Fn(usize) -> bool>(question: &ChoiceQuestion, selected: F) -> Vec<String> {
    question
        .displayed()
        .iter()
        .map(|entry| choice_label(&entry.item.text, entry.item.arabic_text.as_deref(), selected(entry.original_index)))
        .collect()
}

fn choice_prompt<F: Fn(usize) -> bool>(question: &ChoiceQuestion, selected: F) -> String {
    let mut text = question.question.clone();
    if let Some(arabic) = &question.arabic_text {
        text.push_str(&format!("\n{}", arabic));
    }
    let picked: Vec<String> = question
        .displayed()
        .iter()
        .filter(|entry| selected(entry.original_index))
        .map(|entry| entry.item.text.clone())
        .collect();
    if !picked.is_empty() {
        text.push_str(&format!("\n\nPilihan Anda: {}", picked.join(", ")));
    }
    text
}

/// Clickable words with their part index. Selected words carry a mark.
fn word_labels(question: &WordIdentification, selection: &BTreeSet<usize>) -> Vec<(usize, String)> {
    question
        .question_parts
        .iter()
        .enumerate()
        .filter(|(_, part)| part.is_word)
        .map(|(index, part)| {
            let label = match question.mark(index, selection.contains(&index)) {
                WordMark::CorrectSelection | WordMark::IncorrectSelection => format!("☑️ {}", part.text),
                WordMark::Missed | WordMark::Plain => part.text.clone(),
            };
            (index, label)
        })
        .collect()
}

fn next_slot(answer: &SlotAnswer) -> Option<Slot> {
    Slot::ALL.into_iter().find(|slot| answer.get(*slot).is_none())
}

fn irab_prompt(session: &Session<IrabWord>) -> String {
    let Some(page) = session.current_page() else {
        return String::new();
    };
    let focused = focus(session).map(|word| word.id().clone());
    let mut text = String::new();
    for word in &page.items {
        let answer = session.response(word.id()).cloned().unwrap_or_default();
        let filled: Vec<String> = Slot::ALL
            .iter()
            .map(|slot| answer.get(*slot).unwrap_or("…").to_string())
            .collect();
        let pointer = if focused.as_ref() == Some(word.id()) && !session.is_checked(word.id()) {
            "👉"
        } else {
            "▫️"
        };
        text.push_str(&format!("\n{} {}: {}", pointer, word.text, filled.join(" / ")));
        if session.is_checked(word.id()) {
            let verdict = word.evaluate(Some(&answer));
            text.push_str(&format!("\n   {} {}", symbol(verdict), word.feedback(verdict).unwrap_or_default()));
        }
    }
    if let Some(word) = focus(session).filter(|word| !session.is_checked(word.id())) {
        let answer = session.response(word.id()).cloned().unwrap_or_default();
        if let Some(slot) = next_slot(&answer) {
            text.push_str(&format!("\n\n{} untuk {}?", slot, word.text));
        }
    }
    text
}
