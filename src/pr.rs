//! Compact dynamic trie in the Poyias-Raman layout.
//!
//! After Poyias and Raman, "Improved practical compact dynamic tries",
//! SPIRE 2015 (the m-Bonsai scheme).
//!
//! A node is simply the slot its edge landed in. Collisions resolve by
//! linear probing rightward from the home remainder, and every cell records
//! how far it sits from its home: `[quotient | displacement | final bit]`.
//! The displacement field is deliberately narrow because most probes are
//! short; the rare long tail spills into a small ordered side map keyed by
//! slot. The root's slot is never probed into (it is skipped without
//! counting), which keeps the root available as a node id without spending
//! a reserved symbol on it.

use std::collections::BTreeMap;
use std::io::{self};

use crate::alphabet::ByteAlphabet;
use crate::displaylevel;
use crate::hash::{bit_width, prime_above, scramble, HashPair, NOT_FOUND};
use crate::intvec::IntVector;
use crate::trie::{BuildError, Trie};

const FBIT: u64 = 1;

/// PR trie over a bit-packed open-addressing table with a displacement
/// overflow map.
///
/// Capacity is fixed at construction; the caller sizes `num_slots` to the
/// expected node count divided by the intended load factor.
#[derive(Debug)]
pub struct PrTrie {
    num_strs: u64,
    num_slots: u64,
    num_nodes: u64,
    alp_size: u64,
    width_1st: u8,
    root_id: u64,
    empty_mark: u64,
    max_dsp1st: u64,
    prime: u64,
    multiplier: u64,
    slots: IntVector,
    aux_map: BTreeMap<u64, u64>,
    alphabet: ByteAlphabet,
}

impl PrTrie {
    /// Builds an empty trie with `num_slots` cells for symbols in
    /// `[0, alp_size)`; displacements of `(1 << width_1st) - 1` or more
    /// overflow into the side map.
    pub fn new(num_slots: u64, alp_size: u64, width_1st: u8) -> Result<Self, BuildError> {
        // The largest raw composite key; the scrambling prime must exceed it.
        let raw_key_max = alp_size
            .checked_mul(num_slots)
            .and_then(|m| m.checked_add(num_slots.saturating_sub(1)))
            .ok_or(BuildError::DomainOverflow)?;

        let root_id = num_slots / 2;
        // Strictly above any quotient the hash can produce.
        let empty_mark = alp_size + 2;

        // Validate the cell layout before any shift depends on it.
        let cell_width = bit_width(empty_mark) + u32::from(width_1st) + 1;
        if cell_width > 64 {
            return Err(BuildError::CellWidth(cell_width));
        }
        let max_dsp1st = (1u64 << width_1st) - 1;

        if bit_width(alp_size - 1) < bit_width(empty_mark) {
            displaylevel!(
                3,
                "note: quotient field widened from {} to {} bits to hold the empty mark\n",
                bit_width(alp_size - 1),
                bit_width(empty_mark)
            );
        }

        let empty_cell = empty_mark << (u32::from(width_1st) + 1);
        let slots = IntVector::new(num_slots, cell_width, empty_cell)?;

        let prime = prime_above(raw_key_max);
        let multiplier = u64::MAX / prime;

        Ok(PrTrie {
            num_strs: 0,
            num_slots,
            num_nodes: 1,
            alp_size,
            width_1st,
            root_id,
            empty_mark,
            max_dsp1st,
            prime,
            multiplier,
            slots,
            aux_map: BTreeMap::new(),
            alphabet: ByteAlphabet::new(),
        })
    }

    /// Adds a byte key. Returns `true` when it was newly inserted.
    ///
    /// # Panics
    ///
    /// Panics when the key pushes the distinct-byte count past `alp_size`;
    /// the interning table was sized for a smaller concrete alphabet.
    pub fn insert(&mut self, key: &[u8]) -> bool {
        let mut node = self.root_id;
        let mut is_tail = false;
        for &b in key {
            let sym = self.alphabet.intern(b, self.alp_size);
            is_tail = self.add_child(&mut node, sym, is_tail);
        }
        self.mark_terminal(node, is_tail)
    }

    /// Membership test for a byte key.
    pub fn search(&self, key: &[u8]) -> bool {
        let mut node = self.root_id;
        for &b in key {
            let Some(sym) = self.alphabet.lookup(b) else {
                return false;
            };
            if !self.get_child(&mut node, sym) {
                return false;
            }
        }
        self.get_fbit(node)
    }

    /// Adds a key given directly as internal symbols, bypassing the byte
    /// interning table. Symbols must lie in `[0, alp_size)`.
    pub fn insert_symbols(&mut self, syms: &[u64]) -> bool {
        let mut node = self.root_id;
        let mut is_tail = false;
        for &sym in syms {
            is_tail = self.add_child(&mut node, sym, is_tail);
        }
        self.mark_terminal(node, is_tail)
    }

    /// Membership test over internal symbols.
    pub fn search_symbols(&self, syms: &[u64]) -> bool {
        let mut node = self.root_id;
        for &sym in syms {
            if !self.get_child(&mut node, sym) {
                return false;
            }
        }
        self.get_fbit(node)
    }

    /// Number of keys stored.
    pub fn num_strs(&self) -> u64 {
        self.num_strs
    }

    /// Number of trie nodes, the root included.
    pub fn num_nodes(&self) -> u64 {
        self.num_nodes
    }

    /// Table capacity in slots.
    pub fn num_slots(&self) -> u64 {
        self.num_slots
    }

    /// Number of displacement values spilled into the side map.
    pub fn num_aux_entries(&self) -> u64 {
        self.aux_map.len() as u64
    }

    /// Mean displacement over all occupied slots.
    pub fn calc_ave_dsp(&self) -> f64 {
        let mut used = 0u64;
        let mut sum = 0u64;
        for pos in 0..self.num_slots {
            if self.get_quo(pos) != self.empty_mark {
                used += 1;
                sum += self.get_dsp(pos);
            }
        }
        sum as f64 / used as f64
    }

    /// Writes diagnostic lines to `out`.
    pub fn show_stat(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "PrTrie stat.")?;
        writeln!(out, "num slots:   {}", self.num_slots)?;
        writeln!(out, "num nodes:   {}", self.num_nodes)?;
        writeln!(out, "load factor: {}", self.num_nodes as f64 / self.num_slots as f64)?;
        writeln!(out, "num auxs:    {}", self.aux_map.len())?;
        writeln!(out, "auxs rate:   {}", self.aux_map.len() as f64 / self.num_slots as f64)?;
        writeln!(out, "alp size:    {}", self.alp_size)?;
        writeln!(out, "width 1st:   {}", self.width_1st)?;
        writeln!(out, "size slots:  {}", self.slots.size_in_bytes())?;
        writeln!(out, "average dsp: {}", self.calc_ave_dsp())?;
        Ok(())
    }

    fn mark_terminal(&mut self, node: u64, is_tail: bool) -> bool {
        if self.get_fbit(node) {
            debug_assert!(!is_tail);
            return false;
        }
        self.set_fbit(node, true);
        self.num_strs += 1;
        true
    }

    #[inline]
    fn hash(&self, node_id: u64, symbol: u64) -> HashPair {
        let c = symbol * self.num_slots + node_id;
        scramble(c, self.prime, self.multiplier, self.num_slots)
    }

    #[inline]
    fn check_symbol(&self, symbol: u64) {
        assert!(
            symbol < self.alp_size,
            "symbol {symbol} outside the alphabet bound {}",
            self.alp_size
        );
    }

    #[inline]
    fn check_quo(&self, hv: &HashPair) {
        assert!(
            hv.quo < self.empty_mark,
            "quotient {} reached the empty mark {}; slot layout too narrow",
            hv.quo,
            self.empty_mark
        );
    }

    /// Follows the edge `symbol` out of `node_id`, updating it on success.
    ///
    /// Probes rightward from the home remainder. The root's slot is skipped
    /// without advancing the displacement count, so displacements recorded
    /// on either side of it stay comparable.
    fn get_child(&self, node_id: &mut u64, symbol: u64) -> bool {
        self.check_symbol(symbol);
        let hv = self.hash(*node_id, symbol);
        self.check_quo(&hv);

        let mut pos = hv.rem;
        let mut cnt = 0u64;
        loop {
            if pos == self.root_id {
                pos = self.right(pos);
                continue;
            }
            let quo = self.get_quo(pos);
            if quo == self.empty_mark {
                return false;
            }
            if quo == hv.quo && self.get_dsp(pos) == cnt {
                *node_id = pos;
                return true;
            }
            pos = self.right(pos);
            cnt += 1;
        }
    }

    /// Follows the edge `symbol` out of `node_id`, creating the child when
    /// it does not exist. Returns `true` when a node was created.
    ///
    /// `is_tail` marks that an earlier symbol of the current key already
    /// created a fresh node: every remaining transition is then guaranteed
    /// new, so the probe goes straight to the first empty slot without the
    /// match comparison.
    fn add_child(&mut self, node_id: &mut u64, symbol: u64, is_tail: bool) -> bool {
        self.check_symbol(symbol);
        let hv = self.hash(*node_id, symbol);
        self.check_quo(&hv);

        let mut pos = hv.rem;
        let mut cnt = 0u64;
        loop {
            if pos == self.root_id {
                pos = self.right(pos);
                continue;
            }
            let quo = self.get_quo(pos);
            if quo == self.empty_mark {
                self.update_slot(pos, hv.quo, cnt, false);
                *node_id = pos;
                self.num_nodes += 1;
                return true;
            }
            if !is_tail && quo == hv.quo && self.get_dsp(pos) == cnt {
                *node_id = pos;
                return false;
            }
            pos = self.right(pos);
            cnt += 1;
        }
    }

    #[inline]
    fn right(&self, pos: u64) -> u64 {
        let next = pos + 1;
        if next >= self.num_slots {
            0
        } else {
            next
        }
    }

    #[inline]
    fn get_quo(&self, pos: u64) -> u64 {
        self.slots.get(pos) >> (u32::from(self.width_1st) + 1)
    }

    /// Displacement recorded at `pos`: the inline field, or the side map
    /// when the field is saturated.
    fn get_dsp(&self, pos: u64) -> u64 {
        let dsp = (self.slots.get(pos) >> 1) & self.max_dsp1st;
        if dsp < self.max_dsp1st {
            return dsp;
        }
        match self.aux_map.get(&pos) {
            Some(&d) => d,
            None => {
                // A saturated field always has a side-map entry; an
                // occupied slot without one cannot arise.
                debug_assert!(false, "saturated displacement at slot {pos} lacks a side entry");
                NOT_FOUND
            }
        }
    }

    #[inline]
    fn get_fbit(&self, pos: u64) -> bool {
        self.slots.get(pos) & FBIT != 0
    }

    fn set_fbit(&mut self, pos: u64, bit: bool) {
        let cell = self.slots.get(pos) & !FBIT;
        self.slots.set(pos, cell | if bit { FBIT } else { 0 });
    }

    fn update_slot(&mut self, pos: u64, quo: u64, dsp: u64, fbit: bool) {
        let mut cell = quo << (u32::from(self.width_1st) + 1);
        if dsp < self.max_dsp1st {
            cell |= dsp << 1;
        } else {
            cell |= self.max_dsp1st << 1;
            debug_assert!(!self.aux_map.contains_key(&pos));
            self.aux_map.insert(pos, dsp);
        }
        self.slots.set(pos, cell | u64::from(fbit));
    }
}

impl Trie for PrTrie {
    fn name() -> &'static str {
        "PrTrie"
    }

    fn insert(&mut self, key: &[u8]) -> bool {
        PrTrie::insert(self, key)
    }

    fn search(&self, key: &[u8]) -> bool {
        PrTrie::search(self, key)
    }

    fn num_strs(&self) -> u64 {
        PrTrie::num_strs(self)
    }

    fn show_stat(&self, out: &mut dyn io::Write) -> io::Result<()> {
        PrTrie::show_stat(self, out)
    }
}
