//! Per-object action permissions
//!
//! Each context action carries a 2-bit level. Levels only ever move down
//! (the ratchet), so once an action has been restricted it can never be
//! re-enabled for the lifetime of the object.

use crate::{KernelError, Result};

/// Actions gated by an object's permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Action {
    Encrypt = 0,
    Decrypt = 1,
    Sign = 2,
    SigCheck = 3,
    Hash = 4,
    GenKey = 5,
}

impl Action {
    pub const COUNT: usize = 6;
    pub const ALL: [Action; Self::COUNT] = [
        Action::Encrypt,
        Action::Decrypt,
        Action::Sign,
        Action::SigCheck,
        Action::Hash,
        Action::GenKey,
    ];

    const fn shift(self) -> u32 {
        self as u32 * ActionPerms::BITS_PER_ACTION
    }
}

/// How far an action is available
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ActionLevel {
    /// Not supported by the object at all
    NotAvail = 0,
    /// Supported but disabled for everyone
    None = 1,
    /// Only the kernel and backends may perform it
    NoneExternal = 2,
    All = 3,
}

impl ActionLevel {
    const fn from_bits(bits: u16) -> Self {
        match bits & 0b11 {
            0 => ActionLevel::NotAvail,
            1 => ActionLevel::None,
            2 => ActionLevel::NoneExternal,
            _ => ActionLevel::All,
        }
    }
}

/// Packed action levels, two bits per [`Action`]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionPerms(u16);

impl ActionPerms {
    const BITS_PER_ACTION: u32 = 2;

    /// Every action unavailable
    pub const NOT_AVAILABLE: Self = Self(0);

    /// Every action allowed from anywhere
    pub const ALL: Self = Self(0x0FFF);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & Self::ALL.0)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Copy with one action set to `level`
    pub const fn with(self, action: Action, level: ActionLevel) -> Self {
        let mask: u16 = 0b11 << action.shift();
        Self((self.0 & !mask) | ((level as u16) << action.shift()))
    }

    /// Every action at the same level
    pub const fn uniform(level: ActionLevel) -> Self {
        let mut perms = Self::NOT_AVAILABLE;
        let mut i = 0;
        while i < Action::COUNT {
            perms = perms.with(Action::ALL[i], level);
            i += 1;
        }
        perms
    }

    pub const fn level(self, action: Action) -> ActionLevel {
        ActionLevel::from_bits(self.0 >> action.shift())
    }

    /// Combine with `new`, keeping the more restrictive level per action
    pub fn ratchet(self, new: ActionPerms) -> ActionPerms {
        Action::ALL.iter().fold(self, |perms, &action| {
            let level = new.level(action);
            if level < perms.level(action) {
                perms.with(action, level)
            } else {
                perms
            }
        })
    }

    /// Check that `action` may be performed.
    ///
    /// External callers need [`ActionLevel::All`]; internal callers need at
    /// least [`ActionLevel::NoneExternal`].
    pub fn check(self, action: Action, internal: bool) -> Result<()> {
        let level = self.level(action);
        let required = if internal {
            ActionLevel::NoneExternal
        } else {
            ActionLevel::All
        };
        if level >= required {
            return Ok(());
        }
        if level == ActionLevel::NotAvail {
            Err(KernelError::NotAvail)
        } else {
            Err(KernelError::Permission)
        }
    }
}

impl Default for ActionPerms {
    fn default() -> Self {
        Self::ALL
    }
}

impl core::fmt::Debug for ActionPerms {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut list = f.debug_map();
        for action in Action::ALL {
            list.entry(&action, &self.level(action));
        }
        list.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_level() {
        let perms = ActionPerms::NOT_AVAILABLE
            .with(Action::Sign, ActionLevel::All)
            .with(Action::Hash, ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::Sign), ActionLevel::All);
        assert_eq!(perms.level(Action::Hash), ActionLevel::NoneExternal);
        assert_eq!(perms.level(Action::Encrypt), ActionLevel::NotAvail);
    }

    #[test]
    fn test_ratchet_only_lowers() {
        let current = ActionPerms::ALL.with(Action::Decrypt, ActionLevel::None);
        let requested = ActionPerms::uniform(ActionLevel::NoneExternal);
        let result = current.ratchet(requested);

        assert_eq!(result.level(Action::Encrypt), ActionLevel::NoneExternal);
        // Already lower than requested, stays put
        assert_eq!(result.level(Action::Decrypt), ActionLevel::None);

        let raised = result.ratchet(ActionPerms::ALL);
        assert_eq!(raised, result);
    }

    #[test]
    fn test_check_levels() {
        let perms = ActionPerms::NOT_AVAILABLE
            .with(Action::Encrypt, ActionLevel::All)
            .with(Action::Decrypt, ActionLevel::NoneExternal)
            .with(Action::Sign, ActionLevel::None);

        assert!(perms.check(Action::Encrypt, false).is_ok());
        assert!(perms.check(Action::Decrypt, true).is_ok());
        assert_eq!(perms.check(Action::Decrypt, false), Err(KernelError::Permission));
        assert_eq!(perms.check(Action::Sign, true), Err(KernelError::Permission));
        assert_eq!(perms.check(Action::Hash, true), Err(KernelError::NotAvail));
    }

    #[test]
    fn test_uniform() {
        assert_eq!(ActionPerms::uniform(ActionLevel::All), ActionPerms::ALL);
        assert_eq!(
            ActionPerms::uniform(ActionLevel::NotAvail),
            ActionPerms::NOT_AVAILABLE
        );
    }
}
