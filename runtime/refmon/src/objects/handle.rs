//! Object handles and handle allocation
//!
//! A handle packs a table index (low 22 bits) with a generation counter
//! (high 10 bits). The generation of a slot is bumped every time the slot
//! is freed, so a handle kept past the destruction of its object no longer
//! matches the slot and is rejected instead of silently addressing the
//! slot's next occupant.
//!
//! Indices are not handed out sequentially. [`HandleSequence`] walks the
//! table with a maximal-length LFSR, which makes handle values hard to
//! predict and spreads reuse of freed slots across the whole table.

use core::fmt;

use static_assertions::const_assert;

use crate::config::{MAX_TABLE_SIZE, MIN_TABLE_SIZE};

const INDEX_BITS: u32 = 22;
const GENERATION_BITS: u32 = 10;
const INDEX_MASK: u32 = (1 << INDEX_BITS) - 1;
const GENERATION_MASK: u32 = (1 << GENERATION_BITS) - 1;

const_assert!(INDEX_BITS + GENERATION_BITS == 32);
const_assert!(MAX_TABLE_SIZE == 1 << INDEX_BITS);

/// Number of slots reserved for the fixed system objects
pub const SYSTEM_OBJECT_COUNT: usize = 2;

/// Opaque reference to an object in the kernel's object table
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u32);

impl ObjectHandle {
    /// The system device, root of every dependency chain
    pub const SYSTEM_DEVICE: Self = Self(0);

    /// The default user, owner of everything created through the system device
    pub const DEFAULT_USER: Self = Self(1);

    pub(crate) const fn new(index: usize, generation: u16) -> Self {
        Self(((generation as u32 & GENERATION_MASK) << INDEX_BITS) | (index as u32 & INDEX_MASK))
    }

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn index(self) -> usize {
        (self.0 & INDEX_MASK) as usize
    }

    pub const fn generation(self) -> u16 {
        ((self.0 >> INDEX_BITS) & GENERATION_MASK) as u16
    }

    /// True for the two fixed system objects
    pub const fn is_system(self) -> bool {
        self.0 == Self::SYSTEM_DEVICE.0 || self.0 == Self::DEFAULT_USER.0
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHandle({}/{})", self.index(), self.generation())
    }
}

impl fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

/// Next generation for a slot that is being freed
pub(crate) const fn next_generation(generation: u16) -> u16 {
    ((generation as u32 + 1) & GENERATION_MASK) as u16
}

/// Primitive polynomials for LFSRs of period `2^n - 1`, one per table size
/// from 256 to 4M entries. The top set bit of each is the table size.
const LFSR_POLYNOMIALS: [usize; 15] = [
    0x11D, 0x211, 0x409, 0x805, 0x1053, 0x201B, 0x402B, 0x8003, 0x1002D, 0x20009, 0x40027,
    0x80027, 0x100009, 0x200005, 0x400003,
];

const_assert!(LFSR_POLYNOMIALS[0] >> 8 == 1);
const_assert!(LFSR_POLYNOMIALS[14] >> 22 == 1);

fn polynomial_for(table_size: usize) -> Option<usize> {
    LFSR_POLYNOMIALS
        .iter()
        .copied()
        .find(|poly| poly & table_size != 0 && *poly < table_size << 1)
}

/// Pseudorandom walk over the table indices
///
/// The walk visits every index in `1..size` once per period; index 0 is
/// never produced and index 1 is occupied by the default user, so neither
/// can be handed out as an ordinary object.
#[derive(Debug, Clone)]
pub(crate) struct HandleSequence {
    value: usize,
    size: usize,
    poly: usize,
}

impl HandleSequence {
    /// Start a walk over a table of `size` slots.
    ///
    /// Returns `None` if `size` is not a supported power of two.
    pub fn new(size: usize, seed: usize) -> Option<Self> {
        if !size.is_power_of_two() || !(MIN_TABLE_SIZE..=MAX_TABLE_SIZE).contains(&size) {
            return None;
        }
        let poly = polynomial_for(size)?;
        let mut value = seed & (size - 1);
        if value < SYSTEM_OBJECT_COUNT {
            value = SYSTEM_OBJECT_COUNT + 42;
        }
        Some(Self { value, size, poly })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    fn step(&mut self) {
        self.value <<= 1;
        if self.value & self.size != 0 {
            self.value ^= self.poly;
        }
    }

    /// Advance to the next index accepted by `is_free`.
    ///
    /// The sequence always advances before testing, so the index returned
    /// last time is not offered again until the walk wraps. Returns `None`
    /// once a full period has been walked without finding a free slot.
    pub fn next_free(&mut self, mut is_free: impl FnMut(usize) -> bool) -> Option<usize> {
        let start = self.value;
        loop {
            self.step();
            if is_free(self.value) {
                return Some(self.value);
            }
            if self.value == start {
                return None;
            }
        }
    }

    /// Switch to the polynomial for a table twice the size.
    ///
    /// The current position is kept; it is a valid LFSR state for the
    /// larger table as well.
    pub fn expand(&mut self) -> Option<()> {
        let size = self.size.checked_mul(2)?;
        if size > MAX_TABLE_SIZE {
            return None;
        }
        self.poly = polynomial_for(size)?;
        self.size = size;
        Some(())
    }
}
