use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// A scalar parameter that is either known locally or resolved only by
/// the remote execution engine.
///
/// Every shape operation consults this classification before choosing
/// between the eager arithmetic path and the symbolic fallback path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    /// A constant available without executing anything.
    Literal(i64),
    /// An engine-resolved reference. Comparable by identity only.
    Deferred(OpaqueRef),
}

impl Value {
    /// Whether this value is a known constant.
    pub fn is_literal(&self) -> bool {
        matches!(self, Value::Literal(_))
    }

    /// The constant form of this value, if it has one.
    pub fn as_literal(&self) -> Option<i64> {
        match self {
            Value::Literal(n) => Some(*n),
            Value::Deferred(_) => None,
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Literal(n)
    }
}

impl From<OpaqueRef> for Value {
    fn from(r: OpaqueRef) -> Self {
        Value::Deferred(r)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Literal(n) => write!(f, "{}", n),
            Value::Deferred(r) => write!(f, "{}", r),
        }
    }
}

/// An opaque reference to a value held by the remote execution engine:
/// an originating handle plus the access path leading from it.
///
/// References carry enough provenance for the engine to resolve the
/// value later; locally they support only identity comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OpaqueRef {
    handle: String,
    path: Vec<PathSeg>,
}

/// One step in an [`OpaqueRef`] access path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathSeg {
    /// The shape attribute of a tensor handle.
    Shape,
    /// The element at a literal axis.
    Axis(i64),
    /// The element at an axis the engine must resolve first.
    AxisRef(Box<OpaqueRef>),
    /// A contiguous sub-sequence.
    Range {
        start: Option<Value>,
        stop: Option<Value>,
    },
    /// The number of elements.
    Len,
}

impl OpaqueRef {
    /// A root reference to an engine-side handle.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            path: Vec::new(),
        }
    }

    /// The originating handle identifier.
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// The access path from the handle to the referenced value.
    pub fn path(&self) -> &[PathSeg] {
        &self.path
    }

    /// Derive a reference by appending one path segment.
    pub fn child(&self, seg: PathSeg) -> Self {
        let mut path = self.path.clone();
        path.push(seg);
        Self {
            handle: self.handle.clone(),
            path,
        }
    }
}

impl fmt::Display for OpaqueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.handle)?;
        for seg in &self.path {
            match seg {
                PathSeg::Shape => write!(f, ".shape")?,
                PathSeg::Axis(i) => write!(f, "[{}]", i)?,
                PathSeg::AxisRef(r) => write!(f, "[{}]", r)?,
                PathSeg::Range { start, stop } => {
                    write!(f, "[")?;
                    if let Some(start) = start {
                        write!(f, "{}", start)?;
                    }
                    write!(f, ":")?;
                    if let Some(stop) = stop {
                        write!(f, "{}", stop)?;
                    }
                    write!(f, "]")?;
                }
                PathSeg::Len => write!(f, ".len")?,
            }
        }
        Ok(())
    }
}
