#![no_main]
use std::collections::HashSet;

use bonsai_tries::PrTrie;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Newline-separated keys; same workload cap as the DCW target.
    let data = &data[..data.len().min(2048)];
    let distinct: HashSet<u8> = data.iter().copied().collect();
    if distinct.len() > 250 {
        return;
    }

    let mut trie = PrTrie::new(8192, 253, 4).unwrap();
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
