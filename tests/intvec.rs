// Round-trip coverage for the bit-packed vector at awkward widths.

use bonsai_tries::IntVector;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn random_round_trip_across_widths() {
    let mut rng = StdRng::seed_from_u64(0x5EED_CAFE);
    for &width in &[1u32, 7, 17, 33, 64] {
        let mask = u64::MAX >> (64 - width);
        let len = 10_000u64;
        let mut v = IntVector::new(len, width, 0).unwrap();
        let mut mirror = vec![0u64; len as usize];

        for i in 0..len {
            let val = rng.gen::<u64>() & mask;
            v.set(i, val);
            mirror[i as usize] = val;
        }
        for i in 0..len {
            assert_eq!(v.get(i), mirror[i as usize], "width {width}, cell {i}");
        }

        // Scattered rewrites must leave every other cell untouched.
        for _ in 0..1_000 {
            let i = rng.gen_range(0..len);
            let val = rng.gen::<u64>() & mask;
            v.set(i, val);
            mirror[i as usize] = val;
        }
        for i in 0..len {
            assert_eq!(
                v.get(i),
                mirror[i as usize],
                "width {width}, cell {i} after rewrites"
            );
        }
    }
}

#[test]
fn init_pattern_round_trips_at_every_width() {
    for width in 1..=64u32 {
        let mask = u64::MAX >> (64 - width);
        let v = IntVector::new(257, width, u64::MAX).unwrap();
        for i in 0..257 {
            assert_eq!(v.get(i), mask, "width {width}, cell {i}");
        }
    }
}

#[test]
fn reported_size_covers_the_payload() {
    let v = IntVector::new(1_000, 13, 0).unwrap();
    // 13_000 payload bits, one spare chunk, plus the inline fields.
    assert!(v.size_in_bytes() >= 13_000 / 8);
    assert_eq!(v.len(), 1_000);
    assert_eq!(v.width(), 13);
}
