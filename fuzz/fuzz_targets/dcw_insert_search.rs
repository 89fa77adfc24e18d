#![no_main]
use std::collections::HashSet;

use bonsai_tries::DcwTrie;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Newline-separated keys. Cap the workload so the fixed-size table
    // stays inside its sizing contract (that contract is the caller's
    // responsibility, not a property under test here).
    let data = &data[..data.len().min(2048)];
    let distinct: HashSet<u8> = data.iter().copied().collect();
    if distinct.len() > 250 {
        return;
    }

    let mut trie = DcwTrie::new(8192, 253, 7).unwrap();
    let mut mirror: HashSet<&[u8]> = HashSet::new();

    for key in data.split(|&b| b == b'\n') {
        let newly = mirror.insert(key);
        assert_eq!(trie.insert(key), newly, "insert disagrees on {key:?}");
    }

    for key in &mirror {
        assert!(trie.search(key), "lost key {key:?}");
    }
    assert_eq!(trie.num_strs(), mirror.len() as u64);
});
