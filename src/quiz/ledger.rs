use std::collections::BTreeMap;

use log::debug;

use crate::quiz::{Answered, QuestionId};

#[derive(Debug, Clone, PartialEq)]
struct Entry<V> {
    value: V,
    locked: bool,
}

/// Learner responses keyed by question id.
///
/// Writes are rejected once the whole ledger is sealed (quiz submitted) or
/// once the entry itself is locked (question checked). Rejections are not
/// errors: they return `false` and leave the ledger untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger<V> {
    entries: BTreeMap<QuestionId, Entry<V>>,
    sealed: bool,
}

impl<V> Default for Ledger<V> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            sealed: false,
        }
    }
}

impl<V: Answered> Ledger<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_writable(&self, id: &QuestionId) -> bool {
        if self.sealed {
            debug!("ledger sealed, ignoring write to {}", id);
            return false;
        }
        if self.is_locked(id) {
            debug!("entry {} already checked, ignoring write", id);
            return false;
        }
        true
    }

    /// Overwrites the response for `id`.
    pub fn set(&mut self, id: &QuestionId, value: V) -> bool {
        if !self.is_writable(id) {
            return false;
        }
        self.entries.insert(
            id.clone(),
            Entry {
                value,
                locked: false,
            },
        );
        true
    }

    /// Edits the response for `id` in place, starting from `V::default()`
    /// when nothing was recorded yet.
    pub fn update<F>(&mut self, id: &QuestionId, edit: F) -> bool
    where
        V: Default,
        F: FnOnce(&mut V),
    {
        if !self.is_writable(id) {
            return false;
        }
        let entry = self.entries.entry(id.clone()).or_insert_with(|| Entry {
            value: V::default(),
            locked: false,
        });
        edit(&mut entry.value);
        true
    }

    /// The recorded response, `None` when unanswered.
    pub fn get(&self, id: &QuestionId) -> Option<&V> {
        self.entries.get(id).map(|entry| &entry.value)
    }

    pub fn is_answered(&self, id: &QuestionId) -> bool {
        self.get(id).is_some_and(Answered::is_answered)
    }

    pub fn all_answered<'a, I>(&self, ids: I) -> bool
    where
        I: IntoIterator<Item = &'a QuestionId>,
    {
        ids.into_iter().all(|id| self.is_answered(id))
    }

    /// Makes a single entry read-only. Locking an unanswered entry is refused.
    pub fn lock(&mut self, id: &QuestionId) -> bool {
        if self.sealed {
            return false;
        }
        match self.entries.get_mut(id) {
            Some(entry) if !entry.locked => {
                entry.locked = true;
                true
            }
            _ => false,
        }
    }

    pub fn is_locked(&self, id: &QuestionId) -> bool {
        self.entries.get(id).is_some_and(|entry| entry.locked)
    }

    /// Makes every entry read-only until `clear`.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.sealed = false;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn id(raw: &str) -> QuestionId {
        QuestionId::from(raw)
    }

    #[test]
    fn unanswered_questions_read_as_none() {
        let ledger: Ledger<usize> = Ledger::new();
        assert_eq!(ledger.get(&id("q1")), None);
        assert!(!ledger.is_answered(&id("q1")));
    }

    #[test]
    fn set_overwrites_previous_answer() {
        let mut ledger = Ledger::new();
        assert!(ledger.set(&id("q1"), 2usize));
        assert!(ledger.set(&id("q1"), 0usize));
        assert_eq!(ledger.get(&id("q1")), Some(&0));
    }

    #[test]
    fn sealed_ledger_rejects_every_write() {
        let mut ledger = Ledger::new();
        ledger.set(&id("q1"), "kitab".to_string());
        ledger.seal();

        let before = ledger.clone();
        assert!(!ledger.set(&id("q1"), "qalam".to_string()));
        assert!(!ledger.set(&id("q2"), "bait".to_string()));
        assert!(!ledger.update(&id("q1"), |v| v.push('!')));
        assert_eq!(ledger, before);
    }

    #[test]
    fn locked_entry_is_read_only_while_others_stay_open() {
        let mut ledger = Ledger::new();
        ledger.set(&id("a"), true);
        ledger.set(&id("b"), false);
        assert!(ledger.lock(&id("a")));

        assert!(!ledger.set(&id("a"), false));
        assert_eq!(ledger.get(&id("a")), Some(&true));
        assert!(ledger.set(&id("b"), true));
        assert!(!ledger.lock(&id("a")));
    }

    #[test]
    fn cannot_lock_what_was_never_answered() {
        let mut ledger: Ledger<bool> = Ledger::new();
        assert!(!ledger.lock(&id("missing")));
    }

    #[test]
    fn update_merges_into_a_default_value() {
        let mut ledger: Ledger<BTreeSet<usize>> = Ledger::new();
        ledger.update(&id("q"), |set| {
            set.insert(3);
        });
        ledger.update(&id("q"), |set| {
            set.insert(1);
        });
        assert_eq!(ledger.get(&id("q")), Some(&BTreeSet::from([1, 3])));
    }

    #[test]
    fn all_answered_uses_the_value_definition_of_answered() {
        let mut ledger: Ledger<String> = Ledger::new();
        let ids = [id("1"), id("2")];
        ledger.set(&ids[0], "مكة".to_string());
        ledger.set(&ids[1], "   ".to_string());
        assert!(!ledger.all_answered(&ids));

        ledger.set(&ids[1], " المدينة ".to_string());
        assert!(ledger.all_answered(&ids));
    }

    #[test]
    fn clear_reopens_the_ledger() {
        let mut ledger = Ledger::new();
        ledger.set(&id("q"), 1usize);
        ledger.lock(&id("q"));
        ledger.seal();
        ledger.clear();

        assert!(ledger.is_empty());
        assert!(!ledger.is_sealed());
        assert!(ledger.set(&id("q"), 4usize));
    }
}
