
use rand::{Rng, SeedableRng};

/// Seeded bytes drawn from the first `alphabet` byte values, skewed so that
/// low values are more common.
pub(crate) fn skewed_bytes(seed: u64, len: usize, alphabet: usize) -> Vec<u8> {
    assert!((1..=256).contains(&alphabet));
    let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
    (0..len)
        .map(|_| {
            let a = rng.gen_range(0..alphabet);
            let b = rng.gen_range(0..alphabet);
            a.min(b) as u8
        })
        .collect()
}
