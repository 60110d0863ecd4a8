use rand::Rng;

/// In-place Fisher–Yates shuffle. Every permutation is equally likely given
/// a uniform `rng`.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Uniformly random `limit`-subset of `candidates`, in random order.
#[must_use]
pub fn sample<T, R: Rng + ?Sized>(mut candidates: Vec<T>, limit: usize, rng: &mut R) -> Vec<T> {
    shuffle(&mut candidates, rng);
    candidates.truncate(limit);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{HashMap, HashSet};

    #[test]
    fn sample_is_exact_size_and_distinct() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample((0..30).collect(), 6, &mut rng);
        assert_eq!(picked.len(), 6);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 6);

        let short = sample(vec![1, 2], 6, &mut rng);
        assert_eq!(short.len(), 2);
    }

    #[test]
    fn ordered_pairs_are_roughly_uniform() {
        // 4 candidates, pick 2: 12 ordered outcomes, each expected 1/12.
        const TRIALS: usize = 24_000;
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
        for _ in 0..TRIALS {
            *seen.entry(sample(vec![0u8, 1, 2, 3], 2, &mut rng)).or_default() += 1;
        }

        assert_eq!(seen.len(), 12);
        let expected = TRIALS / 12;
        for (outcome, count) in &seen {
            let deviation = count.abs_diff(expected);
            assert!(
                deviation < expected / 8,
                "{outcome:?} drawn {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn empty_and_single_are_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut empty: Vec<u8> = Vec::new();
        shuffle(&mut empty, &mut rng);
        let mut one = vec![9];
        shuffle(&mut one, &mut rng);
        assert_eq!(one, vec![9]);
    }
}
