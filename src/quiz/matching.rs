use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::quiz::shuffle::shuffle_owned;
use crate::quiz::{Answered, Policy, QuestionId, QuizItem, Score, Verdict};

/// A draggable item and the id of the target it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchItem {
    pub id: String,
    pub text: String,
    pub match_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct Target {
    pub id: String,
    pub text: String,
}

/// Which items sit in which target, in drop order. Items not listed are in
/// the pool.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Placement(BTreeMap<String, Vec<String>>);

impl Placement {
    /// Moves `item` into `target`, taking it out of wherever it was.
    pub fn place(&mut self, item: &str, target: &str) {
        if self.target_of(item) == Some(target) {
            return;
        }
        self.unplace(item);
        self.0
            .entry(target.to_string())
            .or_default()
            .push(item.to_string());
    }

    /// Sends `item` back to the pool.
    pub fn unplace(&mut self, item: &str) {
        for items in self.0.values_mut() {
            items.retain(|placed| placed != item);
        }
        self.0.retain(|_, items| !items.is_empty());
    }

    pub fn items_in(&self, target: &str) -> &[String] {
        self.0.get(target).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn target_of(&self, item: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, items)| items.iter().any(|placed| placed == item))
            .map(|(target, _)| target.as_str())
    }

    pub fn placed_count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl Answered for Placement {
    fn is_answered(&self) -> bool {
        self.placed_count() > 0
    }
}

/// Drag every item onto its target. The whole board is one scorable
/// question worth one point per target.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingBoard {
    #[serde(default)]
    pub id: QuestionId,
    #[serde(default)]
    pub instruction: Option<String>,
    pub items: Vec<MatchItem>,
    pub targets: Vec<Target>,
    #[serde(default)]
    pub shuffle_left: bool,
    #[serde(default)]
    pub shuffle_right: bool,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(skip)]
    left: Vec<MatchItem>,
    #[serde(skip)]
    right: Vec<Target>,
}

impl MatchingBoard {
    pub fn new(id: impl Into<QuestionId>, items: Vec<MatchItem>, targets: Vec<Target>) -> Self {
        Self {
            id: id.into(),
            left: items.clone(),
            right: targets.clone(),
            items,
            targets,
            ..Self::default()
        }
    }

    /// Items in the order they were dealt for this session.
    pub fn dealt_items(&self) -> &[MatchItem] {
        if self.left.len() == self.items.len() {
            &self.left
        } else {
            &self.items
        }
    }

    /// Targets in display order.
    pub fn dealt_targets(&self) -> &[Target] {
        if self.right.len() == self.targets.len() {
            &self.right
        } else {
            &self.targets
        }
    }

    /// Unplaced items. Before anything is placed the pool keeps the dealt
    /// order; once items move around it is kept sorted by id.
    pub fn pool(&self, placement: &Placement) -> Vec<&MatchItem> {
        let mut pool: Vec<&MatchItem> = self
            .dealt_items()
            .iter()
            .filter(|item| placement.target_of(&item.id).is_none())
            .collect();
        if placement.is_answered() {
            pool.sort_by(|a, b| a.id.cmp(&b.id));
        }
        pool
    }

    pub fn item(&self, id: &str) -> Option<&MatchItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn target_text(&self, id: &str) -> Option<&str> {
        self.targets
            .iter()
            .find(|target| target.id == id)
            .map(|target| target.text.as_str())
    }

    pub fn expected_items(&self, target: &str) -> BTreeSet<&str> {
        self.items
            .iter()
            .filter(|item| item.match_id == target)
            .map(|item| item.id.as_str())
            .collect()
    }

    /// A target is right when it holds exactly the items meant for it.
    pub fn is_target_correct(&self, target: &str, placement: &Placement) -> bool {
        let placed: BTreeSet<&str> = placement.items_in(target).iter().map(String::as_str).collect();
        placed.len() == placement.items_in(target).len() && placed == self.expected_items(target)
    }

    pub fn correct_targets(&self, placement: &Placement) -> usize {
        self.targets
            .iter()
            .filter(|target| self.is_target_correct(&target.id, placement))
            .count()
    }

    pub fn is_item_correct(&self, item: &str, placement: &Placement) -> bool {
        match (self.item(item), placement.target_of(item)) {
            (Some(item), Some(target)) => item.match_id == target,
            _ => false,
        }
    }
}

impl QuizItem for MatchingBoard {
    type Response = Placement;
    const POLICY: Policy = Policy::single_shot(true);

    fn id(&self) -> &QuestionId {
        &self.id
    }

    fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Self {
        let left = if self.shuffle_left {
            shuffle_owned(self.items.clone(), rng)
        } else {
            self.items.clone()
        };
        let right = if self.shuffle_right {
            shuffle_owned(self.targets.clone(), rng)
        } else {
            self.targets.clone()
        };
        Self {
            left,
            right,
            ..self.clone()
        }
    }

    /// Complete once every item on the board sits in some target. Ids the
    /// board does not know do not count.
    fn is_complete(&self, response: Option<&Placement>) -> bool {
        let Some(placement) = response else {
            return false;
        };
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|item| placement.target_of(&item.id).is_some())
    }

    fn evaluate(&self, response: Option<&Placement>) -> Verdict {
        match response {
            Some(placement) if placement.is_answered() => {
                Verdict::from_matches(self.correct_targets(placement), self.targets.len())
            }
            _ => Verdict::Unanswered,
        }
    }

    fn score(&self, response: Option<&Placement>) -> Score {
        let correct = response.map_or(0, |placement| self.correct_targets(placement));
        Score::new(correct, self.targets.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::Session;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn item(id: &str, text: &str, match_id: &str) -> MatchItem {
        MatchItem {
            id: id.to_string(),
            text: text.to_string(),
            match_id: match_id.to_string(),
        }
    }

    fn target(id: &str, text: &str) -> Target {
        Target {
            id: id.to_string(),
            text: text.to_string(),
        }
    }

    fn board() -> MatchingBoard {
        MatchingBoard::new(
            "board",
            vec![
                item("A", "كِتَابٌ", "isim"),
                item("B", "قَلَمٌ", "isim"),
                item("C", "كَتَبَ", "fiil"),
                item("D", "فِي", "harf"),
            ],
            vec![target("isim", "Isim"), target("fiil", "Fi'il"), target("harf", "Harf")],
        )
    }

    #[test]
    fn target_needs_exactly_its_items() {
        let board = board();
        let mut placement = Placement::default();
        placement.place("A", "isim");
        placement.place("B", "isim");
        placement.place("C", "isim");
        assert!(!board.is_target_correct("isim", &placement));

        placement.place("C", "fiil");
        assert!(board.is_target_correct("isim", &placement));
        assert!(board.is_target_correct("fiil", &placement));
        assert!(!board.is_target_correct("harf", &placement));
    }

    #[test]
    fn placing_moves_items_between_targets() {
        let mut placement = Placement::default();
        placement.place("A", "fiil");
        placement.place("A", "isim");
        assert_eq!(placement.target_of("A"), Some("isim"));
        assert!(placement.items_in("fiil").is_empty());

        placement.unplace("A");
        assert_eq!(placement.target_of("A"), None);
        assert!(!placement.is_answered());
    }

    #[test]
    fn returned_items_come_back_sorted() {
        let board = board().prepare(&mut StdRng::seed_from_u64(3));
        let mut placement = Placement::default();
        placement.place("D", "harf");
        placement.place("B", "isim");
        placement.unplace("D");
        let pool: Vec<&str> = board.pool(&placement).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(pool, vec!["A", "C", "D"]);
    }

    #[test]
    fn board_verdict_counts_targets() {
        let board = board();
        let mut placement = Placement::default();
        assert_eq!(board.evaluate(Some(&placement)), Verdict::Unanswered);

        placement.place("A", "isim");
        placement.place("B", "isim");
        placement.place("C", "harf");
        placement.place("D", "fiil");
        assert_eq!(board.evaluate(Some(&placement)), Verdict::Partial);
        assert_eq!(board.score(Some(&placement)), Score::new(1, 3));

        placement.place("C", "fiil");
        placement.place("D", "harf");
        assert_eq!(board.evaluate(Some(&placement)), Verdict::Correct);
    }

    #[test]
    fn shuffled_sides_keep_every_entry() {
        let board = MatchingBoard {
            shuffle_left: true,
            shuffle_right: true,
            ..board()
        }
        .prepare(&mut StdRng::seed_from_u64(9));
        let mut items: Vec<&str> = board.dealt_items().iter().map(|i| i.id.as_str()).collect();
        items.sort();
        assert_eq!(items, vec!["A", "B", "C", "D"]);
        assert_eq!(board.dealt_targets().len(), 3);
    }

    #[test]
    fn submit_waits_for_an_empty_pool() {
        let mut session = Session::new(vec![board()], false, &mut StdRng::seed_from_u64(1));
        let id = QuestionId::from("board");
        for (item, target) in [("A", "isim"), ("B", "isim"), ("C", "fiil")] {
            session.update(&id, |p| p.place(item, target));
        }
        assert!(!session.can_submit());
        session.update(&id, |p| p.place("D", "fiil"));
        assert!(session.submit());
        assert_eq!(session.score(), Score::new(1, 3));
        assert_eq!(session.verdict(&id), Verdict::Partial);
    }

    #[test]
    fn unknown_items_do_not_fill_the_board() {
        let board = board();
        let mut placement = Placement::default();
        for (item, target) in [("A", "isim"), ("B", "isim"), ("C", "fiil"), ("Z", "harf")] {
            placement.place(item, target);
        }
        assert_eq!(placement.placed_count(), 4);
        assert!(!board.is_complete(Some(&placement)));

        placement.place("D", "harf");
        assert!(board.is_complete(Some(&placement)));
    }
}
