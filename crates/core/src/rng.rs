use rand::seq::SliceRandom;
use rand::{rngs::StdRng, RngCore, SeedableRng};

#[derive(Debug, Clone)]
pub struct RngState {
    seed: u64,
    rng: StdRng,
}

impl RngState {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    /// Fisher–Yates (Durstenfeld): walks from the last slot down to 1 and
    /// swaps each slot with a uniformly chosen slot in `0..=i`.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn shuffle_follows_the_seeded_slice_shuffle() {
        let mut state = RngState::from_seed(11);
        let mut reference = StdRng::seed_from_u64(11);
        let mut ours: Vec<u32> = (0..30).collect();
        let mut theirs = ours.clone();
        state.shuffle(&mut ours);
        theirs.shuffle(&mut reference);
        assert_eq!(ours, theirs);
    }

    #[test]
    fn same_seed_same_order() {
        let mut a = RngState::from_seed(7);
        let mut b = RngState::from_seed(7);
        let mut left: Vec<u32> = (0..20).collect();
        let mut right = left.clone();
        a.shuffle(&mut left);
        b.shuffle(&mut right);
        assert_eq!(left, right);
    }

    #[test]
    fn short_slices_are_untouched() {
        let mut rng = RngState::from_seed(1);
        let mut empty: Vec<u8> = Vec::new();
        rng.shuffle(&mut empty);
        assert!(empty.is_empty());
        let mut one = vec![42];
        rng.shuffle(&mut one);
        assert_eq!(one, vec![42]);
    }

    #[test]
    fn positions_are_roughly_uniform() {
        const N: usize = 4;
        const TRIALS: usize = 40_000;
        let mut rng = RngState::from_seed(0xDEC0DE);
        let mut counts = [[0usize; N]; N];
        for _ in 0..TRIALS {
            let mut items: Vec<usize> = (0..N).collect();
            rng.shuffle(&mut items);
            for (pos, item) in items.iter().enumerate() {
                counts[*item][pos] += 1;
            }
        }
        let expected = TRIALS / N;
        for row in counts {
            for count in row {
                let diff = count.abs_diff(expected);
                assert!(
                    diff < expected / 10,
                    "count {count} too far from {expected}"
                );
            }
        }
    }

    proptest! {
        #[test]
        fn shuffle_is_a_permutation(
            seed in any::<u64>(),
            items in prop::collection::vec(any::<u16>(), 0..64),
        ) {
            let mut rng = RngState::from_seed(seed);
            let mut shuffled = items.clone();
            rng.shuffle(&mut shuffled);
            let mut a = items.clone();
            let mut b = shuffled.clone();
            a.sort_unstable();
            b.sort_unstable();
            prop_assert_eq!(a, b);
        }
    }
}
