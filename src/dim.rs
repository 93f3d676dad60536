use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::value::OpaqueRef;
use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum DimError {
    #[error("invalid dimension size: {size}")]
    InvalidSize { size: i64 },
    #[error("dimension size {size} does not fit in a signed 64-bit value")]
    Oversize { size: u64 },
}

/// The size of one tensor axis.
///
/// A dimension is either a constant known without executing anything,
/// or a deferred reference resolved only by the remote engine. A
/// `Constant` is always non-negative; use [`Dim::constant`] to build
/// one from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dim {
    Constant(i64),
    Deferred(OpaqueRef),
}

impl Dim {
    /// Build a constant dimension, rejecting negative sizes.
    pub fn constant(size: i64) -> Result<Self, DimError> {
        if size < 0 {
            Err(DimError::InvalidSize { size })
        } else {
            Ok(Dim::Constant(size))
        }
    }

    /// Whether this dimension is a known constant.
    pub fn is_literal(&self) -> bool {
        matches!(self, Dim::Constant(_))
    }

    /// The constant size, if known.
    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Dim::Constant(n) => Some(*n),
            Dim::Deferred(_) => None,
        }
    }

    /// Eager exact sum of two constant dimensions. `None` when either
    /// side is deferred or the sum overflows.
    pub fn checked_add(&self, other: &Dim) -> Option<Dim> {
        let sum = self.as_literal()?.checked_add(other.as_literal()?)?;
        Some(Dim::Constant(sum))
    }

    /// Eager exact product of two constant dimensions. `None` when
    /// either side is deferred or the product overflows.
    pub fn checked_mul(&self, other: &Dim) -> Option<Dim> {
        let product = self.as_literal()?.checked_mul(other.as_literal()?)?;
        Some(Dim::Constant(product))
    }
}

impl TryFrom<i64> for Dim {
    type Error = DimError;

    fn try_from(size: i64) -> Result<Self, DimError> {
        Dim::constant(size)
    }
}

impl TryFrom<u64> for Dim {
    type Error = DimError;

    fn try_from(size: u64) -> Result<Self, DimError> {
        let size = i64::try_from(size).map_err(|_| DimError::Oversize { size })?;
        Dim::constant(size)
    }
}

impl TryFrom<usize> for Dim {
    type Error = DimError;

    fn try_from(size: usize) -> Result<Self, DimError> {
        Dim::try_from(size as u64)
    }
}

impl From<OpaqueRef> for Dim {
    fn from(r: OpaqueRef) -> Self {
        Dim::Deferred(r)
    }
}

impl From<Dim> for Value {
    fn from(dim: Dim) -> Self {
        match dim {
            Dim::Constant(n) => Value::Literal(n),
            Dim::Deferred(r) => Value::Deferred(r),
        }
    }
}

impl fmt::Display for Dim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dim::Constant(n) => write!(f, "{}", n),
            Dim::Deferred(r) => write!(f, "{}", r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant() {
        assert_eq!(Dim::constant(4).unwrap(), Dim::Constant(4));
        assert_eq!(Dim::constant(0).unwrap(), Dim::Constant(0));
        assert!(matches!(
            Dim::constant(-1),
            Err(DimError::InvalidSize { size: -1 })
        ));
    }

    #[test]
    fn test_try_from_rejects_out_of_range() {
        assert_eq!(Dim::try_from(4i64).unwrap(), Dim::Constant(4));
        assert_eq!(Dim::try_from(4u64).unwrap(), Dim::Constant(4));
        assert_eq!(Dim::try_from(4usize).unwrap(), Dim::Constant(4));

        assert!(matches!(
            Dim::try_from(-1i64),
            Err(DimError::InvalidSize { size: -1 })
        ));
        assert!(matches!(
            Dim::try_from(u64::MAX),
            Err(DimError::Oversize { size: u64::MAX })
        ));
        assert!(matches!(
            Dim::try_from(usize::MAX),
            Err(DimError::Oversize { .. })
        ));
    }

    #[test]
    fn test_checked_arithmetic() {
        let a = Dim::Constant(3);
        let b = Dim::Constant(4);
        assert_eq!(a.checked_add(&b), Some(Dim::Constant(7)));
        assert_eq!(a.checked_mul(&b), Some(Dim::Constant(12)));

        let sym = Dim::Deferred(OpaqueRef::new("t0"));
        assert_eq!(a.checked_add(&sym), None);
        assert_eq!(sym.checked_mul(&b), None);
    }

    #[test]
    fn test_deferred_equality_is_identity() {
        let a = Dim::Deferred(OpaqueRef::new("t0"));
        let b = Dim::Deferred(OpaqueRef::new("t0"));
        let c = Dim::Deferred(OpaqueRef::new("t1"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
