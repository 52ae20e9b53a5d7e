//! Kernel status codes
//!
//! Every rejection the reference monitor can produce maps onto one variant
//! of [`KernelError`]. The argument-error family (`Arg*`) tells the caller
//! *which* message parameter was at fault: the target object, the message
//! value (usually an attribute id), or one of the numeric/string parameters
//! carried in the message data.

use thiserror::Error;

/// Errors returned by kernel entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KernelError {
    /// The target object is invalid, inaccessible, or of the wrong type/state
    #[error("Bad target object")]
    ArgObject,

    /// The message value (attribute id, item type, mechanism) is invalid
    #[error("Bad message value")]
    ArgValue,

    /// First numeric parameter out of range or of the wrong kind
    #[error("Bad numeric parameter 1")]
    ArgNum1,

    /// Second numeric parameter out of range or of the wrong kind
    #[error("Bad numeric parameter 2")]
    ArgNum2,

    /// First string parameter out of range or missing
    #[error("Bad string parameter 1")]
    ArgStr1,

    /// Second string parameter out of range or present when forbidden
    #[error("Bad string parameter 2")]
    ArgStr2,

    #[error("Operation not permitted")]
    Permission,

    #[error("Item not found")]
    NotFound,

    #[error("Operation not available for this object")]
    NotAvail,

    #[error("Object not initialised")]
    NotInited,

    #[error("Object already initialised")]
    Inited,

    /// The object has been signalled for destruction
    #[error("Object signalled")]
    Signalled,

    #[error("Operation timed out")]
    Timeout,

    /// A fixed-size kernel resource (object table, message queue) is exhausted
    #[error("Kernel resource exhausted")]
    Overflow,

    #[error("Kernel already initialised")]
    AlreadyInitialized,

    #[error("Kernel not initialised")]
    NotInitialized,

    /// Kernel invariant violated: a configuration defect, never retryable
    #[error("Internal kernel error: {reason}")]
    Internal { reason: &'static str },
}

impl KernelError {
    /// True for the argument-error family
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            KernelError::ArgObject
                | KernelError::ArgValue
                | KernelError::ArgNum1
                | KernelError::ArgNum2
                | KernelError::ArgStr1
                | KernelError::ArgStr2
        )
    }

    /// True when the operation may succeed later without caller changes
    pub fn is_transient(&self) -> bool {
        matches!(self, KernelError::Timeout)
    }
}

pub type Result<T> = core::result::Result<T, KernelError>;

/// Report a broken kernel invariant.
///
/// Logs the site and returns [`KernelError::Internal`] from the enclosing
/// function.
macro_rules! internal_error {
    ($reason:expr) => {{
        log::error!("internal kernel error at {}:{}: {}", file!(), line!(), $reason);
        return Err($crate::error::KernelError::Internal { reason: $reason });
    }};
}

pub(crate) use internal_error;

#[cfg(test)]
mod tests {
    use super::*;

    fn fails() -> Result<()> {
        internal_error!("table corrupt");
    }

    #[test]
    fn test_argument_error_family() {
        assert!(KernelError::ArgObject.is_argument_error());
        assert!(KernelError::ArgStr2.is_argument_error());
        assert!(!KernelError::Permission.is_argument_error());
        assert!(!KernelError::Timeout.is_argument_error());
    }

    #[test]
    fn test_internal_error_macro() {
        assert_eq!(
            fails(),
            Err(KernelError::Internal {
                reason: "table corrupt"
            })
        );
    }

    #[test]
    fn test_display() {
        let msg = format!("{}", KernelError::Internal { reason: "x" });
        assert_eq!(msg, "Internal kernel error: x");
    }
}
