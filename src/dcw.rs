//! Compact dynamic trie in the Darragh-Cleary-Witten layout.
//!
//! After Darragh, Cleary and Witten, "Bonsai: a compact representation of
//! trees", Software: Practice and Experience, 1993.
//!
//! The trie keeps no pointers. A node is known by the hash coordinates that
//! created it: the home remainder of the edge that reached it plus its rank
//! inside that home's collision group. Each table cell packs
//! `[quotient | virgin bit | change bit | final bit]`:
//!
//! * the **virgin bit** is set at exactly those slots whose home remainder
//!   currently owns a collision group;
//! * the **change bit** marks one boundary slot per group, so that within a
//!   maximal occupied run the k-th change bit belongs to the k-th
//!   virgin-bit home; counting bits is enough to locate any group without
//!   storing its address;
//! * the **final bit** records that a key ends at this node.
//!
//! Placing a member into a run with no room shifts a cyclic range of slots
//! by one (`copy_from_right`), which keeps groups contiguous while virgin
//! bits stay pinned to their home slots. Home remainders and ranks never
//! change once assigned, so child hashes stay valid across shifts.

use std::io::{self};

use crate::alphabet::ByteAlphabet;
use crate::displaylevel;
use crate::hash::{bit_width, prime_above, scramble, HashPair, NOT_FOUND};
use crate::intvec::IntVector;
use crate::trie::{BuildError, Trie};

// Control-bit layout of one cell, from the least significant end.
const FBIT: u64 = 1;
const CBIT: u64 = 1 << 1;
const VBIT: u64 = 1 << 2;
const QUO_SHIFT: u32 = 3;

/// Identity of a live node.
///
/// Children hash from `(init_pos, num_colls)`, both invariant under group
/// displacement; `slot_pos` tracks the physical cell for the terminal bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct NodeId {
    init_pos: u64,
    num_colls: u64,
    slot_pos: u64,
}

/// DCW trie over a bit-packed open-addressing table.
///
/// Capacity is fixed at construction; the caller sizes `num_slots` to the
/// expected node count divided by the intended load factor.
#[derive(Debug)]
pub struct DcwTrie {
    num_strs: u64,
    num_slots: u64,
    num_nodes: u64,
    alp_size: u64,
    colls_limit: u64,
    root_id: NodeId,
    empty_mark: u64,
    prime: u64,
    multiplier: u64,
    slots: IntVector,
    alphabet: ByteAlphabet,
}

impl DcwTrie {
    /// Builds an empty trie with `num_slots` cells for symbols in
    /// `[0, alp_size)` and per-group capacity `1 << colls_bits`.
    pub fn new(num_slots: u64, alp_size: u64, colls_bits: u8) -> Result<Self, BuildError> {
        let colls_limit = 1u64
            .checked_shl(u32::from(colls_bits))
            .ok_or(BuildError::DomainOverflow)?;
        // The largest raw composite key; the scrambling prime must exceed it.
        let raw_key_max = alp_size
            .checked_mul(colls_limit)
            .and_then(|m| m.checked_mul(num_slots))
            .and_then(|m| m.checked_add(num_slots.saturating_sub(1)))
            .ok_or(BuildError::DomainOverflow)?;

        let root_pos = num_slots / 2;
        // Strictly above any quotient the hash can produce.
        let empty_mark = alp_size * colls_limit + 2;

        if bit_width(alp_size * colls_limit - 1) < bit_width(empty_mark) {
            displaylevel!(
                3,
                "note: quotient field widened from {} to {} bits to hold the empty mark\n",
                bit_width(alp_size * colls_limit - 1),
                bit_width(empty_mark)
            );
        }

        // Empty cells carry a set change bit: every scan that counts change
        // bits stops at the first slot past a run, and that slot must read
        // as a group boundary.
        let empty_cell = (empty_mark << QUO_SHIFT) | CBIT;
        let slots = IntVector::new(num_slots, bit_width(empty_mark) + 3, empty_cell)?;

        let prime = prime_above(raw_key_max);
        let multiplier = u64::MAX / prime;

        let mut trie = DcwTrie {
            num_strs: 0,
            num_slots,
            num_nodes: 1,
            alp_size,
            colls_limit,
            root_id: NodeId {
                init_pos: root_pos,
                num_colls: 0,
                slot_pos: root_pos,
            },
            empty_mark,
            prime,
            multiplier,
            slots,
            alphabet: ByteAlphabet::new(),
        };

        // Stamp the root: any non-empty quotient plus its own virgin bit, so
        // the bit-counting walks see one well-formed single-member group.
        trie.set_quo(root_pos, 0);
        trie.set_vbit(root_pos, true);
        Ok(trie)
    }

    /// Adds a byte key. Returns `true` when it was newly inserted.
    ///
    /// # Panics
    ///
    /// Panics when the key pushes the distinct-byte count past `alp_size`,
    /// or when some collision group outgrows `1 << colls_bits` members;
    /// both mean the table was sized too small for the corpus.
    pub fn insert(&mut self, key: &[u8]) -> bool {
        let mut node = self.root_id;
        for &b in key {
            let sym = self.alphabet.intern(b, self.alp_size);
            self.add_child(&mut node, sym);
        }
        self.mark_terminal(node)
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
        self.get_fbit(node.slot_pos)
    }

    /// Adds a key given directly as internal symbols, bypassing the byte
    /// interning table. Symbols must lie in `[0, alp_size)`.
    pub fn insert_symbols(&mut self, syms: &[u64]) -> bool {
        let mut node = self.root_id;
        for &sym in syms {
            self.add_child(&mut node, sym);
        }
        self.mark_terminal(node)
    }

    /// Membership test over internal symbols.
    pub fn search_symbols(&self, syms: &[u64]) -> bool {
        let mut node = self.root_id;
        for &sym in syms {
            if !self.get_child(&mut node, sym) {
                return false;
            }
        }
        self.get_fbit(node.slot_pos)
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

    /// Writes diagnostic lines to `out`.
    pub fn show_stat(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "DcwTrie stat.")?;
        writeln!(out, "num slots:   {}", self.num_slots)?;
        writeln!(out, "num nodes:   {}", self.num_nodes)?;
        writeln!(out, "load factor: {}", self.num_nodes as f64 / self.num_slots as f64)?;
        writeln!(out, "alp size:    {}", self.alp_size)?;
        writeln!(out, "colls limit: {}", self.colls_limit)?;
        writeln!(out, "size slots:  {}", self.slots.size_in_bytes())?;
        Ok(())
    }

    fn mark_terminal(&mut self, node: NodeId) -> bool {
        if self.get_fbit(node.slot_pos) {
            return false;
        }
        self.set_fbit(node.slot_pos, true);
        self.num_strs += 1;
        true
    }

    #[inline]
    fn hash(&self, node: &NodeId, symbol: u64) -> HashPair {
        let c = (symbol * self.colls_limit + node.num_colls) * self.num_slots + node.init_pos;
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

    /// Follows the edge `symbol` out of `node`, updating `node` on success.
    fn get_child(&self, node: &mut NodeId, symbol: u64) -> bool {
        self.check_symbol(symbol);
        let hv = self.hash(node, symbol);
        self.check_quo(&hv);

        if !self.get_vbit(hv.rem) {
            return false;
        }
        let (cbit_pos, _) = self.find_ass_cbit_pos(hv.rem);
        if cbit_pos == NOT_FOUND {
            return false;
        }
        let mut pos = cbit_pos;
        let num_colls = self.find_item(&mut pos, hv.quo);
        if num_colls >= self.colls_limit {
            return false;
        }
        *node = NodeId {
            init_pos: hv.rem,
            num_colls,
            slot_pos: pos,
        };
        true
    }

    /// Follows the edge `symbol` out of `node`, creating the child when it
    /// does not exist. Returns `true` when a node was created.
    fn add_child(&mut self, node: &mut NodeId, symbol: u64) -> bool {
        self.check_symbol(symbol);
        let hv = self.hash(node, symbol);
        self.check_quo(&hv);

        if self.get_quo(hv.rem) == self.empty_mark {
            // Free home slot: the child opens its own one-member group.
            self.update_slot(hv.rem, hv.quo, true, true, false);
            *node = NodeId {
                init_pos: hv.rem,
                num_colls: 0,
                slot_pos: hv.rem,
            };
            self.num_nodes += 1;
            return true;
        }

        let (mut pos, mut empty_pos) = self.find_ass_cbit_pos(hv.rem);
        let mut num_colls = 0;

        if !self.get_vbit(hv.rem) {
            // No group owns this home yet; open one right after the last
            // group whose home sits at or left of the remainder.
            if pos != NOT_FOUND {
                loop {
                    pos = self.right(pos);
                    if self.get_cbit(pos) {
                        break;
                    }
                }
                // Last member of the group the new one must follow.
                pos = self.left(pos);
                while empty_pos != pos {
                    empty_pos = self.copy_from_right(empty_pos);
                }
            }
            self.set_vbit(hv.rem, true);
            self.set_cbit(empty_pos, true);
        } else {
            num_colls = self.find_item(&mut pos, hv.quo);
            if num_colls < self.colls_limit {
                // The edge already exists.
                *node = NodeId {
                    init_pos: hv.rem,
                    num_colls,
                    slot_pos: pos,
                };
                return false;
            }
            num_colls -= self.colls_limit;
            assert!(
                num_colls < self.colls_limit,
                "collision group for home {} is full ({} members)",
                hv.rem,
                self.colls_limit
            );

            // Shift the tail of the run so the group gains a slot at its
            // right end; the freed slot joins the group.
            pos = self.left(pos);
            while empty_pos != pos {
                empty_pos = self.copy_from_right(empty_pos);
            }
            self.set_cbit(empty_pos, false);
        }

        self.set_quo(empty_pos, hv.quo);
        self.set_fbit(empty_pos, false);
        *node = NodeId {
            init_pos: hv.rem,
            num_colls,
            slot_pos: empty_pos,
        };
        self.num_nodes += 1;
        true
    }

    /// Locates the change-bit slot of the group anchored at `pos`'s home.
    ///
    /// Scans left from `pos` (which must be occupied) counting virgin bits
    /// until the first empty slot; that slot is returned as the second
    /// element. Zero virgin bits means no group belongs to this home and
    /// the first element is [`NOT_FOUND`]. Otherwise the scan turns around
    /// and walks right until it has seen as many change bits as virgin
    /// bits; the slot where the counts first balance delimits the group.
    fn find_ass_cbit_pos(&self, pos: u64) -> (u64, u64) {
        debug_assert!(self.get_quo(pos) != self.empty_mark);

        let mut pos = pos;
        let mut num_vbits = 0u64;
        loop {
            if self.get_vbit(pos) {
                num_vbits += 1;
            }
            pos = self.left(pos);
            if self.get_quo(pos) == self.empty_mark {
                break;
            }
        }
        let empty_pos = pos;

        if num_vbits == 0 {
            return (NOT_FOUND, empty_pos);
        }

        let mut num_cbits = 0u64;
        while num_cbits < num_vbits {
            pos = self.right(pos);
            if self.get_cbit(pos) {
                num_cbits += 1;
            }
        }
        (pos, empty_pos)
    }

    /// Scans the group delimited by the change-bit slot `pos` for `quo`.
    ///
    /// On a hit, returns the member's rank and leaves `pos` at its slot. On
    /// a miss, returns `group_size + colls_limit`, which is always at or above
    /// `colls_limit`, so the caller can both detect absence and recover the
    /// group size.
    fn find_item(&self, pos: &mut u64, quo: u64) -> u64 {
        debug_assert!(self.get_cbit(*pos));

        let mut num_colls = 0u64;
        loop {
            if self.get_quo(*pos) == quo {
                return num_colls;
            }
            *pos = self.right(*pos);
            num_colls += 1;
            if self.get_cbit(*pos) {
                break;
            }
        }
        num_colls + self.colls_limit
    }

    /// Copies the right neighbour's cell into `pos`, keeping `pos`'s own
    /// virgin bit (the bit anchors a home slot, not whatever content
    /// happens to sit there). Returns the neighbour's position.
    fn copy_from_right(&mut self, pos: u64) -> u64 {
        let src = self.right(pos);
        let kept_vbit = self.slots.get(pos) & VBIT;
        self.slots.set(pos, (self.slots.get(src) & !VBIT) | kept_vbit);
        src
    }

    #[inline]
    fn right(&self, pos: u64) -> u64 {
        if pos == self.num_slots - 1 {
            0
        } else {
            pos + 1
        }
    }

    #[inline]
    fn left(&self, pos: u64) -> u64 {
        if pos == 0 {
            self.num_slots - 1
        } else {
            pos - 1
        }
    }

    #[inline]
    fn get_quo(&self, pos: u64) -> u64 {
        self.slots.get(pos) >> QUO_SHIFT
    }

    #[inline]
    fn get_vbit(&self, pos: u64) -> bool {
        self.slots.get(pos) & VBIT != 0
    }

    #[inline]
    fn get_cbit(&self, pos: u64) -> bool {
        self.slots.get(pos) & CBIT != 0
    }

    #[inline]
    fn get_fbit(&self, pos: u64) -> bool {
        self.slots.get(pos) & FBIT != 0
    }

    fn set_quo(&mut self, pos: u64, quo: u64) {
        let ctrl = self.slots.get(pos) & (VBIT | CBIT | FBIT);
        self.slots.set(pos, ctrl | (quo << QUO_SHIFT));
    }

    fn set_vbit(&mut self, pos: u64, bit: bool) {
        let cell = self.slots.get(pos) & !VBIT;
        self.slots.set(pos, cell | if bit { VBIT } else { 0 });
    }

    fn set_cbit(&mut self, pos: u64, bit: bool) {
        let cell = self.slots.get(pos) & !CBIT;
        self.slots.set(pos, cell | if bit { CBIT } else { 0 });
    }

    fn set_fbit(&mut self, pos: u64, bit: bool) {
        let cell = self.slots.get(pos) & !FBIT;
        self.slots.set(pos, cell | if bit { FBIT } else { 0 });
    }

    fn update_slot(&mut self, pos: u64, quo: u64, vbit: bool, cbit: bool, fbit: bool) {
        let mut cell = quo << QUO_SHIFT;
        if vbit {
            cell |= VBIT;
        }
        if cbit {
            cell |= CBIT;
        }
        if fbit {
            cell |= FBIT;
        }
        self.slots.set(pos, cell);
    }
}

impl Trie for DcwTrie {
    fn name() -> &'static str {
        "DcwTrie"
    }

    fn insert(&mut self, key: &[u8]) -> bool {
        DcwTrie::insert(self, key)
    }

    fn search(&self, key: &[u8]) -> bool {
        DcwTrie::search(self, key)
    }

    fn num_strs(&self) -> u64 {
        DcwTrie::num_strs(self)
    }

    fn show_stat(&self, out: &mut dyn io::Write) -> io::Result<()> {
        DcwTrie::show_stat(self, out)
    }
}
