// Behavioural laws for the PR engine: round trips, duplicates, the
// 100-random-keys membership scenario, and a randomized multiset property.

use std::collections::HashSet;

use bonsai_tries::{PrTrie, Trie};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_printable_key(rng: &mut StdRng, len: usize) -> Vec<u8> {
    let mut key: Vec<u8> = (0..len).map(|_| rng.gen_range(0x20..0x7F)).collect();
    key.push(0); // stored keys carry their terminator
    key
}

#[test]
fn insert_then_search_round_trips() {
    let mut trie = PrTrie::new(1 << 12, 253, 4).unwrap();
    let keys: [&[u8]; 4] = [b"to\0", b"tea\0", b"ten\0", b"in\0"];
    for key in keys {
        assert!(trie.insert(key));
    }
    for key in keys {
        assert!(trie.search(key));
    }
    assert!(!trie.search(b"te\0"));
    assert!(!trie.search(b"tean\0"));
    assert_eq!(trie.num_strs(), 4);
}

#[test]
fn num_strs_counts_only_first_insertions() {
    let mut trie = PrTrie::new(256, 253, 4).unwrap();
    assert!(trie.insert(b"dup\0"));
    assert!(!trie.insert(b"dup\0"));
    assert!(!trie.insert(b"dup\0"));
    assert!(trie.insert(b"dup2\0"));
    assert_eq!(trie.num_strs(), 2);
}

/// 100 distinct random 8-byte keys in a 1024-slot table: every member must
/// be found, and sampled non-members must not be. Quotients identify edges
/// exactly, so the membership answer is exact rather than probabilistic.
#[test]
fn hundred_random_keys_membership() {
    let mut rng = StdRng::seed_from_u64(0x9213_2015);
    let mut trie = PrTrie::new(1024, 253, 4).unwrap();

    let mut members: HashSet<Vec<u8>> = HashSet::new();
    while members.len() < 100 {
        members.insert(random_printable_key(&mut rng, 8));
    }
    for key in &members {
        assert!(trie.insert(key));
    }
    assert_eq!(trie.num_strs(), 100);

    for key in &members {
        assert!(trie.search(key), "lost member {key:?}");
    }

    let mut false_hits = 0;
    let mut trials = 0;
    while trials < 100 {
        let key = random_printable_key(&mut rng, 8);
        if members.contains(&key) {
            continue;
        }
        trials += 1;
        if trie.search(&key) {
            false_hits += 1;
        }
    }
    assert_eq!(false_hits, 0, "non-members must not be found");
}

#[test]
fn random_multiset_round_trip() {
    const ALPHABET: &[u8] = b"abcdefghijklmnopqrst";
    let mut rng = StdRng::seed_from_u64(0x6D_B045A1);
    let mut trie = PrTrie::new(1 << 18, 32, 4).unwrap();
    let mut mirror: HashSet<Vec<u8>> = HashSet::new();

    let mut random_key = |rng: &mut StdRng| -> Vec<u8> {
        let len = rng.gen_range(1..=12);
        let mut key: Vec<u8> = (0..len)
            .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
            .collect();
        key.push(0);
        key
    };

    for _ in 0..10_000 {
        let key = random_key(&mut rng);
        let newly = mirror.insert(key.clone());
        assert_eq!(trie.insert(&key), newly, "insert disagrees on {key:?}");
    }
    assert_eq!(trie.num_strs(), mirror.len() as u64);

    for key in &mirror {
        assert!(trie.search(key), "lost member {key:?}");
    }

    let mut rejected = 0;
    while rejected < 2_000 {
        let key = random_key(&mut rng);
        if mirror.contains(&key) {
            continue;
        }
        assert!(!trie.search(&key), "phantom member {key:?}");
        rejected += 1;
    }
}

#[test]
fn stat_report_mentions_the_configuration() {
    let mut trie = PrTrie::new(1024, 253, 4).unwrap();
    trie.insert(b"stat\0");
    let mut out = Vec::new();
    trie.show_stat(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("PrTrie stat."));
    assert!(text.contains("num slots:   1024"));
    assert!(text.contains("width 1st:   4"));
    assert!(text.contains("num auxs:"));
    assert!(text.contains("average dsp:"));
}

#[test]
fn trait_object_dispatch_matches_inherent_calls() {
    let mut trie = PrTrie::new(512, 253, 4).unwrap();
    {
        let t: &mut dyn Trie = &mut trie;
        assert!(t.insert(b"via-trait\0"));
        assert!(t.search(b"via-trait\0"));
        assert_eq!(t.num_strs(), 1);
    }
    assert!(trie.search(b"via-trait\0"));
}
