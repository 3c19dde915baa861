use log::{debug, info};
use rand::Rng;

use crate::quiz::ledger::Ledger;
use crate::quiz::scoring::{Band, Score, Verdict};
use crate::quiz::shuffle::shuffle_owned;
use crate::quiz::{QuestionId, QuizItem};

/// What a single submission covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// One submit for the whole quiz.
    WholeQuiz,
    /// Each question is checked on its own, then results are shown.
    PerQuestion,
    /// Answering a question checks it immediately.
    OnAnswer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Free,
    /// Moving forward requires the current page to be completed.
    Gated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    pub submission: Submission,
    pub navigation: Navigation,
    /// Submit stays disabled until every question is complete (or checked).
    pub require_complete: bool,
    pub shuffle_questions: bool,
}

impl Policy {
    pub const fn single_shot(require_complete: bool) -> Self {
        Self {
            submission: Submission::WholeQuiz,
            navigation: Navigation::Free,
            require_complete,
            shuffle_questions: false,
        }
    }

    pub const fn slider(submission: Submission, navigation: Navigation) -> Self {
        Self {
            submission,
            navigation,
            require_complete: true,
            shuffle_questions: false,
        }
    }

    pub const fn with_shuffled_questions(self, shuffle_questions: bool) -> Self {
        Self {
            shuffle_questions,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    InProgress { current: usize },
    Submitted,
}

/// Questions shown together. I'rab pages hold the words of one sentence,
/// every other kind has one question per page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<Q> {
    pub title: Option<String>,
    pub items: Vec<Q>,
}

impl<Q> Page<Q> {
    pub fn single(item: Q) -> Self {
        Self {
            title: None,
            items: vec![item],
        }
    }

    pub fn titled(title: impl Into<String>, items: Vec<Q>) -> Self {
        Self {
            title: Some(title.into()),
            items,
        }
    }
}

/// Derived state of one question.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub id: QuestionId,
    pub answered: bool,
    pub checked: bool,
    /// `None` until the question is checked or the quiz is submitted.
    pub verdict: Option<Verdict>,
}

/// Everything the presentation layer needs, recomputed on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub phase: Phase,
    pub page_count: usize,
    pub questions: Vec<QuestionView>,
    pub score: Score,
    /// Only set once the quiz is submitted.
    pub band: Option<Band>,
    pub can_advance: bool,
    pub can_retreat: bool,
    pub can_submit: bool,
    pub can_reset: bool,
}

/// One learner's run through a quiz.
#[derive(Debug, Clone)]
pub struct Session<Q: QuizItem> {
    source: Vec<Page<Q>>,
    pages: Vec<Page<Q>>,
    ledger: Ledger<Q::Response>,
    phase: Phase,
    policy: Policy,
}

impl<Q: QuizItem> Session<Q> {
    /// One question per page, with the kind's default policy.
    pub fn new<R: Rng + ?Sized>(questions: Vec<Q>, shuffle_questions: bool, rng: &mut R) -> Self {
        let pages = questions.into_iter().map(Page::single).collect();
        Self::paged(pages, Q::POLICY.with_shuffled_questions(shuffle_questions), rng)
    }

    pub fn paged<R: Rng + ?Sized>(source: Vec<Page<Q>>, policy: Policy, rng: &mut R) -> Self {
        let pages = Self::prepare(&source, &policy, rng);
        Self {
            source,
            pages,
            ledger: Ledger::new(),
            phase: Phase::InProgress { current: 0 },
            policy,
        }
    }

    fn prepare<R: Rng + ?Sized>(source: &[Page<Q>], policy: &Policy, rng: &mut R) -> Vec<Page<Q>> {
        let mut pages = Vec::with_capacity(source.len());
        for page in source {
            let mut items = Vec::with_capacity(page.items.len());
            for item in &page.items {
                items.push(item.prepare(rng));
            }
            pages.push(Page {
                title: page.title.clone(),
                items,
            });
        }
        if policy.shuffle_questions {
            pages = shuffle_owned(pages, rng);
        }
        pages
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_submitted(&self) -> bool {
        self.phase == Phase::Submitted
    }

    /// Current page index, `None` once submitted.
    pub fn current(&self) -> Option<usize> {
        match self.phase {
            Phase::InProgress { current } => Some(current),
            Phase::Submitted => None,
        }
    }

    pub fn pages(&self) -> &[Page<Q>] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> Option<&Page<Q>> {
        self.current().and_then(|index| self.pages.get(index))
    }

    pub fn items(&self) -> impl Iterator<Item = &Q> {
        self.pages.iter().flat_map(|page| page.items.iter())
    }

    pub fn item(&self, id: &QuestionId) -> Option<&Q> {
        self.items().find(|item| item.id() == id)
    }

    pub fn ledger(&self) -> &Ledger<Q::Response> {
        &self.ledger
    }

    pub fn response(&self, id: &QuestionId) -> Option<&Q::Response> {
        self.ledger.get(id)
    }

    fn accepts_writes_for(&self, id: &QuestionId) -> bool {
        if self.is_submitted() {
            debug!("quiz already submitted, ignoring answer for {}", id);
            return false;
        }
        if self.item(id).is_none() {
            debug!("no question with id {}", id);
            return false;
        }
        true
    }

    /// Records `value` as the answer to `id`.
    pub fn answer(&mut self, id: &QuestionId, value: Q::Response) -> bool {
        if !self.accepts_writes_for(id) || !self.ledger.set(id, value) {
            return false;
        }
        if self.policy.submission == Submission::OnAnswer {
            self.ledger.lock(id);
        }
        true
    }

    /// Edits the recorded answer to `id` in place (toggle, merge, move).
    pub fn update<F>(&mut self, id: &QuestionId, edit: F) -> bool
    where
        Q::Response: Default,
        F: FnOnce(&mut Q::Response),
    {
        if !self.accepts_writes_for(id) || !self.ledger.update(id, edit) {
            return false;
        }
        if self.policy.submission == Submission::OnAnswer {
            self.ledger.lock(id);
        }
        true
    }

    /// Checks a single question, making its answer read-only.
    pub fn check(&mut self, id: &QuestionId) -> bool {
        if self.policy.submission != Submission::PerQuestion || self.is_submitted() {
            return false;
        }
        let Some(item) = self.item(id) else {
            return false;
        };
        if !item.is_complete(self.ledger.get(id)) {
            debug!("question {} is not complete, refusing check", id);
            return false;
        }
        self.ledger.lock(id)
    }

    pub fn is_checked(&self, id: &QuestionId) -> bool {
        self.ledger.is_locked(id)
    }

    pub fn is_revealed(&self, id: &QuestionId) -> bool {
        self.is_submitted() || self.is_checked(id)
    }

    pub fn is_complete(&self, id: &QuestionId) -> bool {
        self.item(id)
            .is_some_and(|item| item.is_complete(self.ledger.get(id)))
    }

    /// Verdict of the current answer, whether or not it was revealed yet.
    pub fn verdict(&self, id: &QuestionId) -> Verdict {
        match self.item(id) {
            Some(item) => item.evaluate(self.ledger.get(id)),
            None => Verdict::Unanswered,
        }
    }

    fn item_done(&self, item: &Q) -> bool {
        match self.policy.submission {
            Submission::WholeQuiz => item.is_complete(self.ledger.get(item.id())),
            Submission::PerQuestion | Submission::OnAnswer => self.ledger.is_locked(item.id()),
        }
    }

    pub fn page_completed(&self, index: usize) -> bool {
        self.pages
            .get(index)
            .is_some_and(|page| page.items.iter().all(|item| self.item_done(item)))
    }

    pub fn all_completed(&self) -> bool {
        self.items().all(|item| self.item_done(item))
    }

    fn may_leave(&self, current: usize) -> bool {
        self.policy.navigation == Navigation::Free || self.page_completed(current)
    }

    pub fn can_advance(&self) -> bool {
        match self.phase {
            Phase::InProgress { current } => current + 1 < self.pages.len() && self.may_leave(current),
            Phase::Submitted => false,
        }
    }

    pub fn can_retreat(&self) -> bool {
        matches!(self.phase, Phase::InProgress { current } if current > 0)
    }

    pub fn advance(&mut self) -> bool {
        match self.current() {
            Some(current) => self.go_to(current + 1),
            None => false,
        }
    }

    pub fn retreat(&mut self) -> bool {
        match self.current() {
            Some(current) if current > 0 => self.go_to(current - 1),
            _ => false,
        }
    }

    /// Jumps to page `index`. Going back is always allowed; going forward
    /// follows the navigation gate of the current page.
    pub fn go_to(&mut self, index: usize) -> bool {
        let Some(current) = self.current() else {
            return false;
        };
        if index >= self.pages.len() || index == current {
            return false;
        }
        if index > current && !self.may_leave(current) {
            debug!("page {} not completed, staying", current);
            return false;
        }
        self.phase = Phase::InProgress { current: index };
        true
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitted() && (!self.policy.require_complete || self.all_completed())
    }

    pub fn submit(&mut self) -> bool {
        if !self.can_submit() {
            debug!("submit refused");
            return false;
        }
        self.ledger.seal();
        self.phase = Phase::Submitted;
        info!("quiz submitted with score {}", self.score());
        true
    }

    pub fn can_reset(&self) -> bool {
        self.is_submitted()
    }

    /// Clears every answer and reshuffles. Only allowed after submission.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.can_reset() {
            return false;
        }
        self.ledger.clear();
        self.pages = Self::prepare(&self.source, &self.policy, rng);
        self.phase = Phase::InProgress { current: 0 };
        debug!("quiz reset");
        true
    }

    /// Aggregate over all questions; unrevealed questions only add to the total.
    pub fn score(&self) -> Score {
        self.items()
            .map(|item| {
                if self.is_revealed(item.id()) {
                    item.score(self.ledger.get(item.id()))
                } else {
                    item.score(None)
                }
            })
            .sum()
    }

    pub fn view(&self) -> SessionView {
        let questions = self
            .items()
            .map(|item| {
                let id = item.id();
                QuestionView {
                    id: id.clone(),
                    answered: self.ledger.is_answered(id),
                    checked: self.is_checked(id),
                    verdict: self
                        .is_revealed(id)
                        .then(|| item.evaluate(self.ledger.get(id))),
                }
            })
            .collect();
        let score = self.score();
        SessionView {
            phase: self.phase,
            page_count: self.pages.len(),
            questions,
            score,
            band: self.is_submitted().then(|| score.band()),
            can_advance: self.can_advance(),
            can_retreat: self.can_retreat(),
            can_submit: self.can_submit(),
            can_reset: self.can_reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::shuffle::shuffle_owned;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Minimal kind: pick the right number out of shuffled options.
    #[derive(Debug, Clone, PartialEq)]
    struct Card {
        id: QuestionId,
        answer: usize,
        options: Vec<usize>,
    }

    impl QuizItem for Card {
        type Response = usize;
        const POLICY: Policy = Policy::single_shot(true);

        fn id(&self) -> &QuestionId {
            &self.id
        }

        fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
            Self {
                options: shuffle_owned(self.options.clone(), rng),
                ..self.clone()
            }
        }

        fn evaluate(&self, response: Option<&usize>) -> Verdict {
            match response {
                None => Verdict::Unanswered,
                Some(value) if *value == self.answer => Verdict::Correct,
                Some(_) => Verdict::Incorrect,
            }
        }
    }

    fn card(id: &str, answer: usize) -> Card {
        Card {
            id: QuestionId::from(id),
            answer,
            options: (0..8).collect(),
        }
    }

    fn deck() -> Vec<Card> {
        vec![card("a", 1), card("b", 2), card("c", 3), card("d", 4), card("e", 5)]
    }

    fn id(raw: &str) -> QuestionId {
        QuestionId::from(raw)
    }

    #[test]
    fn whole_quiz_submit_waits_for_every_answer() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        for (raw, value) in [("a", 1), ("b", 2), ("c", 0), ("d", 4)] {
            assert!(session.answer(&id(raw), value));
        }
        assert!(!session.can_submit());
        assert!(!session.submit());

        session.answer(&id("e"), 5);
        assert!(session.submit());
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.score(), Score::new(4, 5));
        assert_eq!(session.view().band, Some(Band::Excellent));
    }

    #[test]
    fn answers_are_frozen_after_submission() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        for (index, item) in deck().iter().enumerate() {
            session.answer(&item.id, index);
        }
        assert!(session.submit());

        let before = session.ledger().clone();
        assert!(!session.answer(&id("a"), 1));
        assert!(!session.update(&id("b"), |v| *v = 2));
        assert_eq!(session.ledger(), &before);
    }

    #[test]
    fn unknown_questions_are_ignored() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        assert!(!session.answer(&id("zz"), 1));
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn reset_clears_answers_and_reshuffles() {
        let mut session = Session::new(deck(), true, &mut StdRng::seed_from_u64(1));
        for item in deck() {
            session.answer(&item.id, item.answer);
        }
        assert!(session.submit());
        assert!(session.reset(&mut StdRng::seed_from_u64(2)));

        let fresh = Session::new(deck(), true, &mut StdRng::seed_from_u64(2));
        assert!(session.ledger().is_empty());
        assert_eq!(session.phase(), Phase::InProgress { current: 0 });
        assert_eq!(session.pages(), fresh.pages());
    }

    #[test]
    fn reset_is_only_offered_after_submission() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        session.answer(&id("a"), 1);
        assert!(!session.can_reset());
        assert!(!session.reset(&mut StdRng::seed_from_u64(2)));
        assert_eq!(session.response(&id("a")), Some(&1));
    }

    #[test]
    fn question_shuffle_keeps_every_question() {
        let session = Session::new(deck(), true, &mut StdRng::seed_from_u64(7));
        let mut ids: Vec<String> = session.items().map(|c| c.id.to_string()).collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn evaluation_is_pure() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        session.answer(&id("c"), 3);
        assert_eq!(session.verdict(&id("c")), session.verdict(&id("c")));
        assert_eq!(session.verdict(&id("c")), Verdict::Correct);
    }

    fn gated(rng: &mut StdRng) -> Session<Card> {
        let pages = vec![
            Page::titled("first", vec![card("a", 1), card("b", 2)]),
            Page::titled("second", vec![card("c", 3)]),
            Page::titled("third", vec![card("d", 4)]),
        ];
        Session::paged(
            pages,
            Policy::slider(Submission::PerQuestion, Navigation::Gated),
            rng,
        )
    }

    #[test]
    fn gated_navigation_waits_for_checked_page() {
        let mut session = gated(&mut StdRng::seed_from_u64(4));
        assert!(!session.can_advance());
        assert!(!session.advance());

        session.answer(&id("a"), 1);
        assert!(session.check(&id("a")));
        assert!(!session.can_advance());

        session.answer(&id("b"), 0);
        assert!(session.check(&id("b")));
        assert!(session.can_advance());
        assert!(session.advance());
        assert_eq!(session.current(), Some(1));

        // backwards is always open
        assert!(session.retreat());
        assert_eq!(session.current(), Some(0));
        assert!(session.go_to(2));
        assert_eq!(session.current(), Some(2));
    }

    #[test]
    fn gate_only_looks_at_the_current_page() {
        let mut session = gated(&mut StdRng::seed_from_u64(4));
        for raw in ["a", "b"] {
            session.answer(&id(raw), 9);
            session.check(&id(raw));
        }
        assert!(session.go_to(1));
        assert!(!session.go_to(2));
        assert!(session.go_to(0));
        assert!(session.go_to(2));
    }

    #[test]
    fn checked_question_is_read_only_and_revealed() {
        let mut session = gated(&mut StdRng::seed_from_u64(4));
        session.answer(&id("a"), 7);
        session.check(&id("a"));

        assert!(!session.answer(&id("a"), 1));
        assert_eq!(session.response(&id("a")), Some(&7));
        let view = session.view();
        assert_eq!(view.questions[0].verdict, Some(Verdict::Incorrect));
        assert_eq!(view.questions[1].verdict, None);
    }

    #[test]
    fn per_question_results_need_every_check() {
        let mut session = gated(&mut StdRng::seed_from_u64(4));
        for (raw, value) in [("a", 1), ("b", 2), ("c", 3), ("d", 0)] {
            session.answer(&id(raw), value);
        }
        assert!(!session.can_submit());
        for raw in ["a", "b", "c", "d"] {
            assert!(session.check(&id(raw)));
        }
        assert!(session.submit());
        assert_eq!(session.score(), Score::new(3, 4));
        assert_eq!(session.view().band, Some(Band::Good));
    }

    #[test]
    fn unchecked_answers_do_not_count_yet() {
        let mut session = gated(&mut StdRng::seed_from_u64(4));
        session.answer(&id("a"), 1);
        assert_eq!(session.score(), Score::new(0, 4));
        session.check(&id("a"));
        assert_eq!(session.score(), Score::new(1, 4));
    }

    #[test]
    fn check_is_refused_for_whole_quiz_sessions() {
        let mut session = Session::new(deck(), false, &mut StdRng::seed_from_u64(1));
        session.answer(&id("a"), 1);
        assert!(!session.check(&id("a")));
        assert!(!session.is_checked(&id("a")));
    }

    #[test]
    fn view_exposes_transitions() {
        let session = gated(&mut StdRng::seed_from_u64(4));
        let view = session.view();
        assert_eq!(view.page_count, 3);
        assert!(!view.can_advance);
        assert!(!view.can_retreat);
        assert!(!view.can_submit);
        assert!(!view.can_reset);
        assert_eq!(view.band, None);
    }
}
