//! Pre-decryption metadata checks.
//!
//! A check sees only the masked cleartext metadata and runs before any
//! cryptographic work, so a router can turn away a whole class of tokens
//! (wrong audience bit, wrong tier) cheaply. Checks run in order and the
//! first rejection wins.

use std::borrow::Cow;
use thiserror::Error;

/// Error returned by a caller-supplied check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Rejection {
    reason: Cow<'static, str>,
}

impl Rejection {
    pub fn new(reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// A predicate over masked metadata.
pub type Check<'a> = &'a (dyn Fn(u16) -> Result<(), Rejection> + Send + Sync);

/// Run `checks` in order against `addt`, stopping at the first rejection.
pub fn run(checks: &[Check<'_>], addt: u16) -> Result<(), Rejection> {
    checks.iter().try_for_each(|check| check(addt))
}

/// Require every bit in `bits` to be set.
pub fn require_bits(bits: u16) -> impl Fn(u16) -> Result<(), Rejection> + Send + Sync {
    move |addt| {
        if addt & bits == bits {
            Ok(())
        } else {
            Err(Rejection::new(format!("metadata missing required bits {bits:#06x}")))
        }
    }
}

/// Require every bit in `bits` to be clear.
pub fn forbid_bits(bits: u16) -> impl Fn(u16) -> Result<(), Rejection> + Send + Sync {
    move |addt| {
        if addt & bits == 0 {
            Ok(())
        } else {
            Err(Rejection::new(format!("metadata carries forbidden bits {bits:#06x}")))
        }
    }
}

/// Require the masked metadata to equal `value` exactly.
pub fn require_value(value: u16) -> impl Fn(u16) -> Result<(), Rejection> + Send + Sync {
    move |addt| {
        if addt == value {
            Ok(())
        } else {
            Err(Rejection::new(format!(
                "metadata {addt:#06x} does not match {value:#06x}"
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn empty_chain_accepts() {
        assert!(run(&[], 0xFFFF).is_ok());
    }

    #[test]
    fn first_rejection_wins_and_short_circuits() {
        let calls = AtomicUsize::new(0);
        let first = |_: u16| -> Result<(), Rejection> { Err(Rejection::new("first")) };
        let second = |_: u16| -> Result<(), Rejection> {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(Rejection::new("second"))
        };
        let chain: [Check<'_>; 2] = [&first, &second];
        let err = run(&chain, 0).unwrap_err();
        assert_eq!(err.reason(), "first");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn bit_helpers() {
        let admin = require_bits(0x0003);
        assert!(admin(0x0007).is_ok());
        assert!(admin(0x0001).is_err());

        let no_guest = forbid_bits(0x0100);
        assert!(no_guest(0x00FF).is_ok());
        assert!(no_guest(0x0100).is_err());

        let exact = require_value(0x34);
        assert!(exact(0x34).is_ok());
        assert_eq!(
            exact(0x35).unwrap_err().reason(),
            "metadata 0x0035 does not match 0x0034"
        );
    }
}
