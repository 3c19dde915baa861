use rand::seq::SliceRandom;
use rand::Rng;

/// An element together with its position before shuffling.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Shuffled<T> {
    pub original_index: usize,
    pub item: T,
}

/// Tags every element with its position, without reordering.
pub fn tagged<T: Clone>(items: &[T]) -> Vec<Shuffled<T>> {
    items
        .iter()
        .cloned()
        .enumerate()
        .map(|(original_index, item)| Shuffled {
            original_index,
            item,
        })
        .collect()
}

/// Fisher-Yates over a tagged copy of `items`; the input is left untouched.
///
/// `SliceRandom::shuffle` walks `i` from `len - 1` down to `1` and swaps it
/// with a uniform index in `0..=i`, so a seeded rng gives a reproducible
/// permutation.
pub fn shuffle_tagged<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Vec<Shuffled<T>> {
    let mut shuffled = tagged(items);
    shuffled.shuffle(rng);
    shuffled
}

/// Shuffles owned elements, moving them rather than copying.
pub fn shuffle_owned<T, R: Rng + ?Sized>(mut items: Vec<T>, rng: &mut R) -> Vec<T> {
    items.shuffle(rng);
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn output_is_a_permutation_of_the_input() {
        let input: Vec<u32> = (0..25).collect();
        let mut rng = StdRng::seed_from_u64(11);
        let shuffled = shuffle_tagged(&input, &mut rng);

        assert_eq!(shuffled.len(), input.len());
        let mut values: Vec<u32> = shuffled.iter().map(|s| s.item).collect();
        values.sort();
        assert_eq!(values, input);
    }

    #[test]
    fn tags_point_back_to_the_original_position() {
        let input = vec!["alif", "ba", "ta", "tsa", "jim"];
        let mut rng = StdRng::seed_from_u64(3);
        for entry in shuffle_tagged(&input, &mut rng) {
            assert_eq!(input[entry.original_index], entry.item);
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let input = vec![1, 2, 3, 4, 5, 6];
        let mut rng = StdRng::seed_from_u64(5);
        let _ = shuffle_tagged(&input, &mut rng);
        assert_eq!(input, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn same_seed_gives_same_permutation() {
        let input: Vec<usize> = (0..12).collect();
        let first = shuffle_tagged(&input, &mut StdRng::seed_from_u64(42));
        let second = shuffle_tagged(&input, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn short_inputs_are_returned_as_is() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(shuffle_tagged::<u8, _>(&[], &mut rng).is_empty());
        let single = shuffle_tagged(&["kitab"], &mut rng);
        assert_eq!(single, vec![Shuffled { original_index: 0, item: "kitab" }]);
    }

    #[test]
    fn owned_shuffle_keeps_every_element() {
        let words: Vec<String> = ["ذهب", "الطالب", "إلى", "المدرسة"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let mut shuffled = shuffle_owned(words.clone(), &mut StdRng::seed_from_u64(9));
        shuffled.sort();
        let mut expected = words;
        expected.sort();
        assert_eq!(shuffled, expected);
    }
}
