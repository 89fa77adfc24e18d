//! Benchmark front end: argument parsing and operation dispatch.
//!
//! Two forms:
//!
//! * `bonsai <keys_file>`: print the exact trie-node count of the key set,
//!   for sizing a later benchmark run;
//! * `bonsai <keys_file> <queries_file|-> <type> <num_nodes> <load_factor>
//!   <colls_bits>`: build one engine (`type` 1 = DCW, 2 = PR), insert the
//!   key file, optionally run the query file, and print timings and stats.
//!
//! Parsing is split from `std::env` so tests can drive it with explicit
//! argument vectors. Bad or missing arguments return an `Err` whose message
//! begins with `bad usage:`.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};

use crate::dcw::DcwTrie;
use crate::displaylevel;
use crate::keyset::{count_trie_nodes, read_keys};
use crate::pr::PrTrie;
use crate::timefn::StopWatch;
use crate::trie::Trie;

/// Alphabet bound handed to both engines on the byte-key path. Leaves room
/// under the 8-bit interning table for the NUL terminator and the reserved
/// marker values.
pub const BYTE_ALP_SIZE: u64 = 253;

/// Which engine a benchmark run drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    Dcw,
    Pr,
}

/// Fully parsed command line.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// Single-argument form: print the exact trie-node count of the keys.
    CountNodes { keys_file: PathBuf },
    /// Full benchmark run.
    Bench {
        keys_file: PathBuf,
        /// `None` when the query argument was `-`.
        queries_file: Option<PathBuf>,
        engine: EngineKind,
        num_nodes: u64,
        load_factor: f64,
        /// `colls_bits` for DCW, `width_1st` for PR.
        aux_bits: u8,
    },
}

/// One-line usage string for error reporting.
pub fn usage(exe: &str) -> String {
    format!("{exe} <keys_file> <queries_file|-> <type> <num_nodes> <load_factor> <colls_bits>")
}

/// Parses an explicit argument list (`argv[1..]`).
pub fn parse_args_from(argv: &[String]) -> Result<Command> {
    match argv.len() {
        1 => Ok(Command::CountNodes {
            keys_file: PathBuf::from(&argv[0]),
        }),
        6 => {
            let engine = match argv[2].as_str() {
                "1" => EngineKind::Dcw,
                "2" => EngineKind::Pr,
                other => bail!("bad usage: type must be 1 (DCW) or 2 (PR), got {other}"),
            };
            let num_nodes: u64 = argv[3]
                .parse()
                .map_err(|_| anyhow!("bad usage: num_nodes must be an integer, got {}", argv[3]))?;
            let load_factor: f64 = argv[4]
                .parse()
                .map_err(|_| anyhow!("bad usage: load_factor must be a number, got {}", argv[4]))?;
            if !(load_factor > 0.0 && load_factor.is_finite()) {
                bail!("bad usage: load_factor must be positive, got {load_factor}");
            }
            let aux_bits: u8 = argv[5]
                .parse()
                .map_err(|_| anyhow!("bad usage: colls_bits must be a small integer, got {}", argv[5]))?;
            let queries_file = if argv[1] == "-" {
                None
            } else {
                Some(PathBuf::from(&argv[1]))
            };
            Ok(Command::Bench {
                keys_file: PathBuf::from(&argv[0]),
                queries_file,
                engine,
                num_nodes,
                load_factor,
                aux_bits,
            })
        }
        n => bail!("bad usage: expected 1 or 6 arguments, got {n}"),
    }
}

/// Executes a parsed command; returns the process exit code.
pub fn run(cmd: Command) -> i32 {
    match try_run(cmd) {
        Ok(()) => 0,
        Err(err) => {
            displaylevel!(1, "bonsai: {err:#}\n");
            1
        }
    }
}

fn try_run(cmd: Command) -> Result<()> {
    match cmd {
        Command::CountNodes { keys_file } => {
            let mut keys = read_keys(&keys_file)?;
            if keys.is_empty() {
                bail!("no keys in {}", keys_file.display());
            }
            println!("#nodes: {}", count_trie_nodes(&mut keys));
            Ok(())
        }
        Command::Bench {
            keys_file,
            queries_file,
            engine,
            num_nodes,
            load_factor,
            aux_bits,
        } => {
            let num_slots = (num_nodes as f64 / load_factor) as u64;
            if num_slots == 0 {
                bail!("bad usage: {num_nodes} nodes at load factor {load_factor} sizes to zero slots");
            }
            displaylevel!(3, "table: {num_slots} slots for {num_nodes} nodes\n");
            match engine {
                EngineKind::Dcw => {
                    let trie = DcwTrie::new(num_slots, BYTE_ALP_SIZE, aux_bits)?;
                    bench(trie, &keys_file, queries_file.as_deref())
                }
                EngineKind::Pr => {
                    let trie = PrTrie::new(num_slots, BYTE_ALP_SIZE, aux_bits)?;
                    bench(trie, &keys_file, queries_file.as_deref())
                }
            }
        }
    }
}

/// Appends the NUL terminator each stored key carries, so no key is a
/// prefix of another once inserted.
fn terminate(mut keys: Vec<Vec<u8>>) -> Vec<Vec<u8>> {
    for key in &mut keys {
        key.push(0);
    }
    keys
}

fn bench<T: Trie>(mut trie: T, keys_file: &Path, queries_file: Option<&Path>) -> Result<()> {
    println!("----- {} -----", T::name());

    let keys = terminate(read_keys(keys_file)?);
    if keys.is_empty() {
        bail!("no keys in {}", keys_file.display());
    }

    let sw = StopWatch::new();
    for key in &keys {
        trie.insert(key);
    }
    let insert_ns = sw.elapsed_ns();
    println!(
        "insert time: {:.1} (ns/key)",
        insert_ns as f64 / trie.num_strs() as f64
    );

    if let Some(queries_file) = queries_file {
        let queries = terminate(read_keys(queries_file)?);
        if queries.is_empty() {
            bail!("no queries in {}", queries_file.display());
        }
        let mut ok = 0u64;
        let mut ng = 0u64;
        let sw = StopWatch::new();
        for query in &queries {
            if trie.search(query) {
                ok += 1;
            } else {
                ng += 1;
            }
        }
        let search_ns = sw.elapsed_ns();
        println!("OK: {ok}, NG: {ng}");
        println!(
            "search time: {:.1} (ns/key)",
            search_ns as f64 / queries.len() as f64
        );
    }

    let stdout = std::io::stdout();
    trie.show_stat(&mut stdout.lock()).context("failed to write stats")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_argument_selects_node_counting() {
        let cmd = parse_args_from(&args(&["words.txt"])).unwrap();
        assert_eq!(
            cmd,
            Command::CountNodes {
                keys_file: PathBuf::from("words.txt")
            }
        );
    }

    #[test]
    fn six_arguments_select_a_benchmark() {
        let cmd = parse_args_from(&args(&["k.txt", "q.txt", "2", "1000", "0.8", "4"])).unwrap();
        assert_eq!(
            cmd,
            Command::Bench {
                keys_file: PathBuf::from("k.txt"),
                queries_file: Some(PathBuf::from("q.txt")),
                engine: EngineKind::Pr,
                num_nodes: 1000,
                load_factor: 0.8,
                aux_bits: 4,
            }
        );
    }

    #[test]
    fn dash_skips_the_query_phase() {
        let cmd = parse_args_from(&args(&["k.txt", "-", "1", "1000", "0.8", "2"])).unwrap();
        match cmd {
            Command::Bench {
                queries_file,
                engine,
                ..
            } => {
                assert_eq!(queries_file, None);
                assert_eq!(engine, EngineKind::Dcw);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn wrong_arity_is_bad_usage() {
        let cases: [&[&str]; 3] = [&[], &["a", "b"], &["a", "b", "1", "10", "0.5"]];
        for case in cases {
            let err = parse_args_from(&args(case)).unwrap_err();
            assert!(err.to_string().starts_with("bad usage:"), "{err}");
        }
    }

    #[test]
    fn bad_fields_are_bad_usage() {
        let cases = [
            ["k", "q", "3", "10", "0.5", "2"],   // unknown engine
            ["k", "q", "1", "ten", "0.5", "2"],  // non-numeric nodes
            ["k", "q", "1", "10", "zero", "2"],  // non-numeric load
            ["k", "q", "1", "10", "0", "2"],     // zero load factor
            ["k", "q", "1", "10", "-1", "2"],    // negative load factor
            ["k", "q", "1", "10", "0.5", "b"],   // non-numeric bits
        ];
        for case in cases {
            let err = parse_args_from(&args(&case)).unwrap_err();
            assert!(err.to_string().starts_with("bad usage:"), "{case:?}: {err}");
        }
    }
}
