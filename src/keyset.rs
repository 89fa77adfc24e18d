//! Key-file loading and exact trie-node counting.
//!
//! The benchmark front end sizes an engine from the exact node count of its
//! key set; [`count_trie_nodes`] computes that count independently of any
//! engine by sorting the keys and counting distinct prefix positions, plus
//! one terminator node per key (stored strings include their trailing NUL).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

/// Reads one key per line as raw bytes. Blank lines are skipped; a trailing
/// `\r` (CRLF input) is stripped along with the newline.
pub fn read_keys(path: &Path) -> Result<Vec<Vec<u8>>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut keys = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .with_context(|| format!("failed to read {}", path.display()))?;
        if n == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        if line.is_empty() {
            continue;
        }
        keys.push(line.clone());
    }
    Ok(keys)
}

/// Exact node count of the trie formed by `keys`, one terminator node per
/// key included. Sorts `keys` in place.
///
/// Walks the sorted range with an explicit stack: each `(begin, end, depth)`
/// span is one internal node, split wherever the byte at `depth` changes.
pub fn count_trie_nodes(keys: &mut [Vec<u8>]) -> u64 {
    if keys.is_empty() {
        return 0;
    }
    keys.sort_unstable();

    struct Span {
        begin: usize,
        end: usize,
        depth: usize,
    }

    let mut stack = vec![Span {
        begin: 0,
        end: keys.len(),
        depth: 0,
    }];
    let mut num_nodes: u64 = 1;

    while let Some(mut span) = stack.pop() {
        // Keys exhausted at this depth contribute no further branching.
        while span.begin < span.end && keys[span.begin].len() == span.depth {
            span.begin += 1;
        }
        if span.begin == span.end {
            continue;
        }
        for i in span.begin + 1..span.end {
            if keys[i - 1][span.depth] != keys[i][span.depth] {
                stack.push(Span {
                    begin: span.begin,
                    end: i,
                    depth: span.depth + 1,
                });
                span.begin = i;
                num_nodes += 1;
            }
        }
        stack.push(Span {
            begin: span.begin,
            end: span.end,
            depth: span.depth + 1,
        });
        num_nodes += 1;
    }

    num_nodes + keys.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(keys: &[&[u8]]) -> u64 {
        let mut owned: Vec<Vec<u8>> = keys.iter().map(|k| k.to_vec()).collect();
        count_trie_nodes(&mut owned)
    }

    #[test]
    fn empty_set_has_no_nodes() {
        assert_eq!(count(&[]), 0);
    }

    #[test]
    fn single_key_counts_path_plus_terminator() {
        // root + 3 characters + 1 terminator
        assert_eq!(count(&[b"abc"]), 5);
    }

    #[test]
    fn shared_prefixes_are_counted_once() {
        // root, a, b, ab (4) + 3 terminators
        assert_eq!(count(&[b"a", b"b", b"ab"]), 7);
    }

    #[test]
    fn disjoint_keys_share_only_the_root() {
        // root + 2 + 2 characters + 2 terminators
        assert_eq!(count(&[b"ab", b"cd"]), 7);
    }

    #[test]
    fn input_order_does_not_matter() {
        assert_eq!(
            count(&[b"carpet", b"car", b"cart"]),
            count(&[b"car", b"cart", b"carpet"])
        );
    }
}
