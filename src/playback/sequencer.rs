use std::sync::Arc;

use rand::{
    rngs::StdRng,
    seq::SliceRandom,
    SeedableRng,
};

use crate::core::FlashcardItem;

/// Ordered view over the filtered catalog plus the current position.
///
/// `position` is `0` whenever the view is empty or has just been recomputed.
pub struct Sequencer {
    items: Vec<Arc<FlashcardItem>>,
    position: usize,
    random_order: bool,
    rng: StdRng,
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deterministic shuffles, for tests and reproducible sessions.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self { items: Vec::new(), position: 0, random_order: false, rng }
    }

    /// Rebuilds the view from `filtered` and resets the position.
    ///
    /// Sequential order groups cards by category in catalog order, then by order hint.
    /// Random order is a fresh uniform permutation on every call.
    pub fn recompute(&mut self, mut filtered: Vec<Arc<FlashcardItem>>, random_order: bool) {
        if random_order {
            filtered.shuffle(&mut self.rng);
        } else {
            filtered.sort_by_key(|item| {
                let category_start = item.catalog_index - item.id.slot;
                (category_start, item.order_key(), item.catalog_index)
            });
        }

        self.items = filtered;
        self.random_order = random_order;
        self.reset_position();
    }

    /// Same as [`Sequencer::recompute`]; named for catalog reloads.
    pub fn replace_items(&mut self, items: Vec<Arc<FlashcardItem>>, random_order: bool) {
        self.recompute(items, random_order);
    }

    pub fn reset_position(&mut self) -> usize {
        self.position = 0;
        self.position
    }

    /// Moves by `delta` with wraparound. `None` when the view is empty.
    pub fn move_by(&mut self, delta: i64) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        let len = self.items.len() as i64;
        let step = delta.rem_euclid(len);
        self.position = ((self.position as i64 + step) % len) as usize;
        Some(self.position)
    }

    /// Jumps to `index`, wrapped into range. `None` when the view is empty.
    pub fn move_to(&mut self, index: usize) -> Option<usize> {
        if self.items.is_empty() {
            return None;
        }

        self.position = index % self.items.len();
        Some(self.position)
    }

    pub fn current(&self) -> Option<&Arc<FlashcardItem>> {
        self.items.get(self.position)
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn items(&self) -> &[Arc<FlashcardItem>] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_random(&self) -> bool {
        self.random_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        catalog::CategorySelection,
        testing::{
            numbered_items,
            sample_catalog,
        },
    };

    fn sequencer_of(len: usize) -> Sequencer {
        let mut sequencer = Sequencer::with_seed(7);
        sequencer.recompute(numbered_items(len), false);
        sequencer
    }

    #[test]
    fn test_move_by_wraps_with_true_modulo() {
        let mut sequencer = sequencer_of(5);

        assert_eq!(sequencer.move_by(-1), Some(4));
        sequencer.reset_position();
        assert_eq!(sequencer.move_by(-7), Some(3));
        sequencer.reset_position();
        assert_eq!(sequencer.move_by(5 + 3), Some(3));
        assert_eq!(sequencer.move_by(1), Some(4));
        assert_eq!(sequencer.move_by(1), Some(0));
    }

    #[test]
    fn test_move_by_extreme_deltas() {
        let mut sequencer = sequencer_of(5);
        sequencer.move_to(2);

        for delta in [i64::MIN, i64::MAX, i64::MIN + 1, -1_000_000_007, 1_000_000_007] {
            let position = sequencer.move_by(delta).unwrap();
            assert!(position < 5, "delta {delta} gave {position}");
        }
    }

    #[test]
    fn test_empty_view_is_a_no_op() {
        let mut sequencer = sequencer_of(0);
        assert_eq!(sequencer.move_by(1), None);
        assert_eq!(sequencer.move_to(3), None);
        assert!(sequencer.current().is_none());
        assert_eq!(sequencer.position(), 0);
    }

    #[test]
    fn test_move_to_wraps() {
        let mut sequencer = sequencer_of(4);
        assert_eq!(sequencer.move_to(2), Some(2));
        assert_eq!(sequencer.move_to(9), Some(1));
        assert_eq!(sequencer.current().unwrap().catalog_index, 1);
    }

    #[test]
    fn test_recompute_resets_position() {
        let catalog = sample_catalog();
        let mut sequencer = Sequencer::with_seed(1);
        sequencer.recompute(catalog.filter_by(&CategorySelection::all()), false);
        sequencer.move_to(3);

        sequencer.recompute(catalog.filter_by(&CategorySelection::from_paths(["Fruit"])), false);
        assert_eq!(sequencer.position(), 0);
        assert_eq!(sequencer.current().unwrap().eng_word, "Apple");
    }

    #[test]
    fn test_sequential_order_keeps_categories_together() {
        let catalog = sample_catalog();
        let mut sequencer = Sequencer::with_seed(1);
        let selection = CategorySelection::from_paths(["Animal", "Fruit"]);
        sequencer.recompute(catalog.filter_by(&selection), false);

        let words: Vec<&str> = sequencer.items().iter().map(|i| i.eng_word.as_str()).collect();
        assert_eq!(words, vec!["Cat", "Dog", "Apple", "Banana", "Grape"]);
    }

    #[test]
    fn test_order_hint_sorts_within_category() {
        let json = r#"{"categories":[
            {"path":"A","korName":"가","engName":"A","items":[
                {"kor_word":"셋","eng_word":"three","image":"http://i/3.png","order":3},
                {"kor_word":"하나","eng_word":"one","image":"http://i/1.png","order":1}]},
            {"path":"B","korName":"나","engName":"B","items":[
                {"kor_word":"영","eng_word":"zero","image":"http://i/0.png","order":0}]}]}"#;
        let catalog = crate::catalog::Catalog::parse(json).unwrap();
        let mut sequencer = Sequencer::with_seed(1);
        sequencer.recompute(catalog.filter_by(&CategorySelection::all()), false);

        let words: Vec<&str> = sequencer.items().iter().map(|i| i.eng_word.as_str()).collect();
        assert_eq!(words, vec!["one", "three", "zero"]);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut sequencer = Sequencer::with_seed(42);
        sequencer.recompute(numbered_items(20), true);
        assert!(sequencer.is_random());

        let mut indices: Vec<usize> = sequencer.items().iter().map(|i| i.catalog_index).collect();
        assert_ne!(indices, (0..20).collect::<Vec<_>>());
        indices.sort_unstable();
        assert_eq!(indices, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_seeded_shuffles_are_reproducible() {
        let order = |seed| {
            let mut sequencer = Sequencer::with_seed(seed);
            sequencer.recompute(numbered_items(12), true);
            sequencer.items().iter().map(|i| i.catalog_index).collect::<Vec<_>>()
        };
        assert_eq!(order(9), order(9));
    }
}
