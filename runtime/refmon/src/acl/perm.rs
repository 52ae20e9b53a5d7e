//! Attribute access permissions
//!
//! Each ACL entry carries a 12-bit permission matrix: read/write/delete
//! for the high and low object states, once for internal and once for
//! external messages. Tables spell the matrix with the compact
//! `"RWD_RWD"` notation (high state on the left, low state on the right,
//! `x` for a denied operation), parsed at compile time by [`perm`] and
//! [`perm_int`].

use bitflags::bitflags;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u16 {
        const INT_READ_HIGH = 1 << 0;
        const INT_WRITE_HIGH = 1 << 1;
        const INT_DELETE_HIGH = 1 << 2;
        const INT_READ_LOW = 1 << 3;
        const INT_WRITE_LOW = 1 << 4;
        const INT_DELETE_LOW = 1 << 5;

        const EXT_READ_HIGH = 1 << 6;
        const EXT_WRITE_HIGH = 1 << 7;
        const EXT_DELETE_HIGH = 1 << 8;
        const EXT_READ_LOW = 1 << 9;
        const EXT_WRITE_LOW = 1 << 10;
        const EXT_DELETE_LOW = 1 << 11;

        const INTERNAL = 0x003F;
        const EXTERNAL = 0x0FC0;
    }
}

const EXTERNAL_SHIFT: u32 = 6;

/// Operation an attribute message performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOp {
    Read,
    Write,
    Delete,
}

impl AccessFlags {
    /// The single bit an operation needs for the given state and caller
    pub const fn required(op: AccessOp, high: bool, internal: bool) -> AccessFlags {
        let mut bit: u16 = match op {
            AccessOp::Read => 1 << 0,
            AccessOp::Write => 1 << 1,
            AccessOp::Delete => 1 << 2,
        };
        if !high {
            bit <<= 3;
        }
        if !internal {
            bit <<= EXTERNAL_SHIFT;
        }
        AccessFlags::from_bits_retain(bit)
    }

    /// True if any operation is open to external callers
    pub const fn has_external(self) -> bool {
        self.intersects(AccessFlags::EXTERNAL)
    }

    /// The internal half shifted into the external position
    pub const fn internal_as_external(self) -> AccessFlags {
        AccessFlags::from_bits_retain((self.bits() & Self::INTERNAL.bits()) << EXTERNAL_SHIFT)
    }
}

/// Parse one `"RWD_RWD"` pattern into internal-side bits
const fn parse(pattern: &str) -> u16 {
    const LETTERS: [u8; 3] = [b'R', b'W', b'D'];
    let bytes = pattern.as_bytes();
    if bytes.len() != 7 || bytes[3] != b'_' {
        panic!("permission pattern must look like RWD_RWD");
    }
    let mut bits = 0u16;
    let mut i = 0;
    while i < 7 {
        if i != 3 {
            let (slot, low) = if i < 3 { (i, false) } else { (i - 4, true) };
            let c = bytes[i];
            if c == LETTERS[slot] {
                let shift = if low { slot + 3 } else { slot };
                bits |= 1 << shift;
            } else if c != b'x' {
                panic!("bad character in permission pattern");
            }
        }
        i += 1;
    }
    bits
}

/// Same permissions for internal and external messages
pub const fn perm(pattern: &str) -> AccessFlags {
    let bits = parse(pattern);
    AccessFlags::from_bits_retain(bits | (bits << EXTERNAL_SHIFT))
}

/// Permissions for internal messages only
pub const fn perm_int(pattern: &str) -> AccessFlags {
    AccessFlags::from_bits_retain(parse(pattern))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_patterns() {
        assert_eq!(perm("xxx_xxx"), AccessFlags::empty());
        assert_eq!(perm("RWD_RWD"), AccessFlags::INTERNAL | AccessFlags::EXTERNAL);

        let p = perm("Rxx_RWx");
        assert!(p.contains(AccessFlags::INT_READ_HIGH | AccessFlags::EXT_READ_HIGH));
        assert!(p.contains(AccessFlags::INT_WRITE_LOW | AccessFlags::EXT_WRITE_LOW));
        assert!(!p.intersects(AccessFlags::INT_WRITE_HIGH | AccessFlags::EXT_DELETE_LOW));
    }

    #[test]
    fn test_internal_only_pattern() {
        let p = perm_int("RWx_RWx");
        assert!(!p.has_external());
        assert!(p.contains(AccessFlags::INT_WRITE_HIGH));
        assert_eq!(p.internal_as_external(), perm("RWx_RWx") & AccessFlags::EXTERNAL);
    }

    #[test]
    fn test_required_bit() {
        assert_eq!(
            AccessFlags::required(AccessOp::Read, true, true),
            AccessFlags::INT_READ_HIGH
        );
        assert_eq!(
            AccessFlags::required(AccessOp::Write, false, false),
            AccessFlags::EXT_WRITE_LOW
        );
        assert_eq!(
            AccessFlags::required(AccessOp::Delete, true, false),
            AccessFlags::EXT_DELETE_HIGH
        );
    }

    #[test]
    #[should_panic]
    fn test_bad_pattern_panics() {
        let _ = perm("RW_RWD");
    }
}
