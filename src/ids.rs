//! Identifier generation and uniform sampling.

use rand::seq::{index, SliceRandom};
use rand::Rng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// `n` characters drawn uniformly from `[a-z0-9]`.
pub fn segment<R: Rng + ?Sized>(rng: &mut R, n: usize) -> String {
    (0..n)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Id for inventory items, accounts and transactions: `12_10`.
pub fn item_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}_{}", segment(rng, 12), segment(rng, 10))
}

/// Public wallet id: `16_12`.
pub fn wallet_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!("{}_{}", segment(rng, 16), segment(rng, 12))
}

/// Sixteen random digits grouped by four: `dddd dddd dddd dddd`.
pub fn card_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let digits: Vec<char> = (0..16)
        .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
        .collect();
    digits
        .chunks(4)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Up to `count` distinct elements of `pool` in random order. Duplicate
/// values in the pool are collapsed first, so the result never repeats.
pub fn pick_unique<R, T>(rng: &mut R, pool: &[T], count: usize) -> Vec<T>
where
    R: Rng + ?Sized,
    T: Clone + PartialEq,
{
    let mut distinct: Vec<&T> = Vec::with_capacity(pool.len());
    for item in pool {
        if !distinct.contains(&item) {
            distinct.push(item);
        }
    }
    let amount = count.min(distinct.len());
    index::sample(rng, distinct.len(), amount)
        .into_iter()
        .map(|i| distinct[i].clone())
        .collect()
}

/// A uniformly chosen element, `None` for an empty slice.
pub fn uniform<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn is_id_char(c: char) -> bool {
        c.is_ascii_lowercase() || c.is_ascii_digit()
    }

    #[test]
    fn wallet_id_shape() {
        let mut rng = StdRng::seed_from_u64(1);
        let id = wallet_id(&mut rng);
        let (a, b) = id.split_once('_').unwrap();
        assert_eq!(a.len(), 16);
        assert_eq!(b.len(), 12);
        assert!(a.chars().chain(b.chars()).all(is_id_char));
    }

    #[test]
    fn card_number_shape() {
        let mut rng = StdRng::seed_from_u64(2);
        let n = card_number(&mut rng);
        assert_eq!(n.len(), 19);
        let groups: Vec<&str> = n.split(' ').collect();
        assert_eq!(groups.len(), 4);
        assert!(groups
            .iter()
            .all(|g| g.len() == 4 && g.chars().all(|c| c.is_ascii_digit())));
    }

    #[test]
    fn pick_unique_collapses_duplicates() {
        let mut rng = StdRng::seed_from_u64(3);
        let pool = ["a", "b", "a", "c"];
        let mut picked = pick_unique(&mut rng, &pool, 10);
        picked.sort();
        assert_eq!(picked, vec!["a", "b", "c"]);
    }

    #[test]
    fn uniform_on_empty_is_none() {
        let mut rng = StdRng::seed_from_u64(4);
        let empty: [u8; 0] = [];
        assert!(uniform(&mut rng, &empty).is_none());
        assert_eq!(uniform(&mut rng, &[9]), Some(&9));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    proptest! {
        #[test]
        fn prop_item_id_format(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let id = item_id(&mut rng);
            prop_assert_eq!(id.len(), 23);
            prop_assert_eq!(id.as_bytes()[12], b'_');
        }

        #[test]
        fn prop_pick_unique_never_repeats(seed in any::<u64>(), count in 0usize..20) {
            let mut rng = StdRng::seed_from_u64(seed);
            let pool: Vec<u32> = (0..15).collect();
            let picked = pick_unique(&mut rng, &pool, count);
            prop_assert_eq!(picked.len(), count.min(15));
            let mut sorted = picked.clone();
            sorted.sort();
            sorted.dedup();
            prop_assert_eq!(sorted.len(), picked.len());
        }
    }
}
