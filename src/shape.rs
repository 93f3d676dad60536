use std::fmt;

use itertools::izip;
use serde::Deserialize;
use serde::Serialize;

use crate::dim::Dim;
use crate::dim::DimError;
use crate::value::OpaqueRef;
use crate::value::PathSeg;
use crate::value::Value;

/// The four failure classes of the shape algebra. Every [`ShapeError`]
/// maps onto exactly one kind via [`ShapeError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed axis, bound, permutation, or negative size.
    InvalidInput,
    /// A constant was required but only a deferred value is available.
    InsufficientInfo,
    /// Broadcast, concatenation, or reshape constraints violated
    /// between otherwise-constant values.
    IncompatibleShapes,
    /// A recognized but unimplemented combination.
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum ShapeError {
    #[error("index {index} out of range for shape of rank {rank}")]
    IndexOutOfRange { index: i64, rank: usize },

    #[error("axis {axis} out of range for shape of rank {rank}")]
    AxisOutOfRange { axis: i64, rank: usize },

    #[error("invalid dimension size {size} at axis {axis}")]
    InvalidSize { axis: usize, size: i64 },

    #[error("invalid permutation {permutation:?} for shape of rank {rank}")]
    InvalidPermutation { permutation: Vec<i64>, rank: usize },

    #[error("reshape supports at most one unknown dimension, not {dims:?}")]
    MultipleUnknown { dims: Vec<i64> },

    #[error("cannot concatenate an empty list of shapes")]
    EmptyConcat,

    #[error("{op} result size overflows")]
    Overflow { op: &'static str },

    #[error("{op} requires a known number of dimensions")]
    UnknownRank { op: &'static str },

    #[error("{op} requires a constant {what}, not {value}")]
    NotConstant {
        op: &'static str,
        what: &'static str,
        value: String,
    },

    #[error("{op} requires a constant dimension at axis {axis}")]
    UnresolvedDim { op: &'static str, axis: usize },

    #[error("cannot infer an unknown dimension from non-constant shape {shape}")]
    CannotInfer { shape: String },

    #[error("shapes have inconsistent ranks: {left} vs {right}")]
    RankMismatch { left: usize, right: usize },

    #[error("cannot broadcast dimensions {left} and {right} at axis {axis}")]
    IncompatibleDims {
        axis: usize,
        left: String,
        right: String,
    },

    #[error("inconsistent dimension at axis {axis}: {left} vs {right}")]
    DimMismatch {
        axis: usize,
        left: String,
        right: String,
    },

    #[error("cannot reshape {from} into {to}")]
    ReshapeMismatch { from: String, to: String },

    #[error("slice with a step is not supported")]
    StepUnsupported,

    #[error(transparent)]
    Dim(#[from] DimError),
}

impl ShapeError {
    /// Classify this error into one of the four failure kinds.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::IndexOutOfRange { .. }
            | Self::AxisOutOfRange { .. }
            | Self::InvalidSize { .. }
            | Self::InvalidPermutation { .. }
            | Self::MultipleUnknown { .. }
            | Self::EmptyConcat
            | Self::Overflow { .. }
            | Self::Dim(_) => ErrorKind::InvalidInput,
            Self::UnknownRank { .. }
            | Self::NotConstant { .. }
            | Self::UnresolvedDim { .. }
            | Self::CannotInfer { .. } => ErrorKind::InsufficientInfo,
            Self::RankMismatch { .. }
            | Self::IncompatibleDims { .. }
            | Self::DimMismatch { .. }
            | Self::ReshapeMismatch { .. } => ErrorKind::IncompatibleShapes,
            Self::StepUnsupported => ErrorKind::Unsupported,
        }
    }
}

/// Whether a shape was fully checked at construction time.
///
/// The algebra takes two documented optimistic shortcuts (broadcast
/// against a one-sided non-1 constant, reshape of a non-constant
/// source); results produced through either are tagged `Assumed` and
/// the tag propagates through further derivations. The remote engine
/// performs the final verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verification {
    Verified,
    Assumed,
}

impl Verification {
    pub fn is_assumed(self) -> bool {
        matches!(self, Verification::Assumed)
    }

    fn meet(self, other: Self) -> Self {
        match (self, other) {
            (Verification::Verified, Verification::Verified) => Verification::Verified,
            _ => Verification::Assumed,
        }
    }
}

/// An ordered sequence of per-axis sizes describing a tensor's
/// dimensionality.
///
/// A shape is either rank-known (the axis count is a local constant,
/// even if individual dimensions are deferred) or rank-unknown (the
/// axis count itself is resolved only by the remote engine). Shapes
/// are immutable; every operation returns a new shape. Equality is
/// structural over the dimension values; provenance and verification
/// do not participate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    repr: Repr,
    verification: Verification,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Repr {
    Known {
        dims: Vec<Dim>,
        origin: Option<OpaqueRef>,
    },
    Deferred(OpaqueRef),
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        match (&self.repr, &other.repr) {
            (Repr::Known { dims: a, .. }, Repr::Known { dims: b, .. }) => a == b,
            (Repr::Deferred(a), Repr::Deferred(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Shape {}

impl Shape {
    /// A rank-known shape from a sequence of dimension values.
    pub fn new(dims: Vec<Dim>) -> Self {
        Self::known(dims, Verification::Verified)
    }

    fn known(dims: Vec<Dim>, verification: Verification) -> Self {
        Self {
            repr: Repr::Known { dims, origin: None },
            verification,
        }
    }

    /// A rank-unknown shape resolved through the given reference.
    pub fn deferred(origin: OpaqueRef) -> Self {
        Self {
            repr: Repr::Deferred(origin),
            verification: Verification::Verified,
        }
    }

    /// The (symbolic) shape attribute of an opaque tensor handle.
    pub fn of(handle: impl Into<String>) -> Self {
        Self::deferred(OpaqueRef::new(handle).child(PathSeg::Shape))
    }

    /// Attach a provenance reference to this shape. Used when a
    /// rank-known shape was derived from an engine-side handle, so
    /// deferred derivations can name their source.
    pub fn with_origin(mut self, origin: OpaqueRef) -> Self {
        if let Repr::Known { origin: o, .. } = &mut self.repr {
            *o = Some(origin);
        }
        self
    }

    /// The number of axes, when known locally.
    pub fn rank(&self) -> Option<usize> {
        match &self.repr {
            Repr::Known { dims, .. } => Some(dims.len()),
            Repr::Deferred(_) => None,
        }
    }

    /// The number of axes as a value: a constant when the rank is
    /// known, otherwise a deferred length reference for the engine.
    pub fn rank_value(&self) -> Value {
        match &self.repr {
            Repr::Known { dims, .. } => Value::Literal(dims.len() as i64),
            Repr::Deferred(origin) => Value::Deferred(origin.child(PathSeg::Len)),
        }
    }

    /// The dimension sequence, when the rank is known.
    pub fn dims(&self) -> Option<&[Dim]> {
        match &self.repr {
            Repr::Known { dims, .. } => Some(dims),
            Repr::Deferred(_) => None,
        }
    }

    /// Total element count, when every dimension is a constant.
    pub fn size(&self) -> Option<i64> {
        let mut total: i64 = 1;
        for dim in self.dims()? {
            total = total.checked_mul(dim.as_literal()?)?;
        }
        Some(total)
    }

    /// Whether the rank itself is unknown locally.
    pub fn is_deferred(&self) -> bool {
        matches!(self.repr, Repr::Deferred(_))
    }

    /// Whether this shape was fully checked at construction time.
    pub fn verification(&self) -> Verification {
        self.verification
    }

    /// The provenance reference this shape was derived from, if any.
    pub fn origin(&self) -> Option<&OpaqueRef> {
        match &self.repr {
            Repr::Known { origin, .. } => origin.as_ref(),
            Repr::Deferred(origin) => Some(origin),
        }
    }

    fn require_rank(&self, op: &'static str) -> Result<usize, ShapeError> {
        self.rank().ok_or(ShapeError::UnknownRank { op })
    }

    fn known_dims(&self, op: &'static str) -> Result<&[Dim], ShapeError> {
        self.dims().ok_or(ShapeError::UnknownRank { op })
    }

    /// The reference used to tag deferred derivations of this shape.
    /// Shapes without an engine-side origin use their rendered form.
    fn provenance(&self) -> OpaqueRef {
        match &self.repr {
            Repr::Known {
                origin: Some(origin),
                ..
            } => origin.clone(),
            Repr::Known { .. } => OpaqueRef::new(self.to_string()),
            Repr::Deferred(origin) => origin.clone(),
        }
    }

    /// The dimension at `index`.
    ///
    /// A literal index is resolved eagerly: negative values count from
    /// the end, out-of-range fails. A deferred index (or a rank-unknown
    /// shape) yields a deferred dimension tagged with the shape's
    /// provenance and the axis expression.
    pub fn get(&self, index: impl Into<Value>) -> Result<Dim, ShapeError> {
        match index.into() {
            Value::Literal(index) => match &self.repr {
                Repr::Known { dims, .. } => {
                    let rank = dims.len();
                    let resolved = if index < 0 { index + rank as i64 } else { index };
                    if resolved < 0 || resolved >= rank as i64 {
                        return Err(ShapeError::IndexOutOfRange { index, rank });
                    }
                    Ok(dims[resolved as usize].clone())
                }
                Repr::Deferred(origin) => Ok(Dim::Deferred(origin.child(PathSeg::Axis(index)))),
            },
            Value::Deferred(r) => Ok(Dim::Deferred(
                self.provenance().child(PathSeg::AxisRef(Box::new(r))),
            )),
        }
    }

    /// The contiguous sub-sequence of this shape covered by `range`.
    ///
    /// With a known rank and literal (or absent) bounds the result is
    /// materialized eagerly; otherwise a deferred sub-sequence
    /// reference is returned. A step fails.
    pub fn range(&self, range: impl Into<Range>) -> Result<Shape, ShapeError> {
        let range = range.into();
        if range.step.is_some() {
            return Err(ShapeError::StepUnsupported);
        }

        let literal = |bound: &Option<Value>| match bound {
            None => Some(None),
            Some(Value::Literal(n)) => Some(Some(*n)),
            Some(Value::Deferred(_)) => None,
        };

        if let (Repr::Known { dims, .. }, Some(start), Some(stop)) =
            (&self.repr, literal(&range.start), literal(&range.stop))
        {
            let len = dims.len() as i64;
            let start = resolve_index(start, len, 0);
            let stop = resolve_index(stop, len, len);
            let mut out = Vec::new();
            for i in start..stop {
                out.push(self.get(i)?);
            }
            return Ok(Shape::known(out, self.verification));
        }

        Ok(Shape::deferred(self.provenance().child(PathSeg::Range {
            start: range.start,
            stop: range.stop,
        })))
    }

    /// The shape obtained by broadcasting this shape with `other`,
    /// following the standard array semantics (equal dimensions, or
    /// one of them is 1), walking axes from trailing to leading.
    ///
    /// When exactly one side of an axis is a constant other than 1,
    /// the constant wins and the result is tagged
    /// [`Verification::Assumed`]: the engine checks the deferred side
    /// at execution time. Two deferred dimensions at the same axis
    /// fail.
    pub fn broadcast(&self, other: &Shape) -> Result<Shape, ShapeError> {
        let left_rank = self.require_rank("broadcast")?;
        let right_rank = other.require_rank("broadcast")?;
        let rank = left_rank.max(right_rank);

        let pad = |dims: &[Dim]| -> Vec<Dim> {
            let mut padded = vec![Dim::Constant(1); rank - dims.len()];
            padded.extend_from_slice(dims);
            padded
        };
        let left = pad(self.known_dims("broadcast")?);
        let right = pad(other.known_dims("broadcast")?);

        let mut verification = self.verification.meet(other.verification);
        let mut dims = vec![Dim::Constant(1); rank];
        for (axis, (l, r)) in izip!(&left, &right).enumerate().rev() {
            dims[axis] = match (l.as_literal(), r.as_literal()) {
                (Some(a), Some(b)) => {
                    if a == b {
                        l.clone()
                    } else if a == 1 {
                        r.clone()
                    } else if b == 1 {
                        l.clone()
                    } else {
                        return Err(ShapeError::IncompatibleDims {
                            axis,
                            left: l.to_string(),
                            right: r.to_string(),
                        });
                    }
                }
                (Some(1), None) => r.clone(),
                (Some(_), None) => {
                    // assume the deferred side matches at execution time
                    verification = Verification::Assumed;
                    l.clone()
                }
                (None, Some(1)) => l.clone(),
                (None, Some(_)) => {
                    verification = Verification::Assumed;
                    r.clone()
                }
                (None, None) => {
                    return Err(ShapeError::UnresolvedDim {
                        op: "broadcast",
                        axis,
                    });
                }
            };
        }

        Ok(Shape::known(dims, verification))
    }

    /// The shape produced by reshaping a tensor of this shape into
    /// `new_shape`.
    ///
    /// A deferred target is returned as-is (the result's shape is
    /// itself symbolic). At most one axis of a literal target may be
    /// the unknown placeholder `-1`; it is solved by exact division of
    /// the source element count. A non-constant source accepts a fully
    /// literal target unverified, tagged [`Verification::Assumed`].
    pub fn reshape(&self, new_shape: impl Into<NewShape>) -> Result<Shape, ShapeError> {
        let target = match new_shape.into() {
            NewShape::Deferred(r) => return Ok(Shape::deferred(r)),
            NewShape::Literal(dims) => dims,
        };

        let mut unknown = None;
        for (axis, &size) in target.iter().enumerate() {
            if size == -1 {
                if unknown.is_some() {
                    return Err(ShapeError::MultipleUnknown {
                        dims: target.clone(),
                    });
                }
                unknown = Some(axis);
            } else if size < 0 {
                return Err(ShapeError::InvalidSize { axis, size });
            }
        }

        match self.size() {
            Some(total) => {
                let mut resolved = target;
                if let Some(axis) = unknown {
                    let rest = checked_product(
                        resolved
                            .iter()
                            .enumerate()
                            .filter(|(x, _)| *x != axis)
                            .map(|(_, &d)| d),
                    );
                    let inferred = match rest {
                        Some(rest) if rest > 0 && total % rest == 0 => total / rest,
                        _ => {
                            return Err(ShapeError::ReshapeMismatch {
                                from: self.to_string(),
                                to: format_dims(&resolved),
                            });
                        }
                    };
                    resolved[axis] = inferred;
                }
                if checked_product(resolved.iter().copied()) != Some(total) {
                    return Err(ShapeError::ReshapeMismatch {
                        from: self.to_string(),
                        to: format_dims(&resolved),
                    });
                }
                Ok(Shape::known(
                    resolved.into_iter().map(Dim::Constant).collect(),
                    self.verification,
                ))
            }
            None if unknown.is_some() => Err(ShapeError::CannotInfer {
                shape: self.to_string(),
            }),
            None => {
                // accepted unverified: the source element count is not
                // known locally
                Ok(Shape::known(
                    target.into_iter().map(Dim::Constant).collect(),
                    Verification::Assumed,
                ))
            }
        }
    }

    /// The shape of the tensor formed by concatenating tensors of the
    /// given shapes along `axis`.
    ///
    /// All shapes must have the same known rank, the axis must be a
    /// constant, and every contributing size along the joined axis
    /// must be a constant. Every other axis must agree structurally
    /// across all inputs.
    pub fn concatenate(shapes: &[Shape], axis: Value) -> Result<Shape, ShapeError> {
        let Some(first) = shapes.first() else {
            return Err(ShapeError::EmptyConcat);
        };
        let rank = first.require_rank("concatenate")?;
        for shape in shapes {
            let other = shape.require_rank("concatenate")?;
            if other != rank {
                return Err(ShapeError::RankMismatch {
                    left: rank,
                    right: other,
                });
            }
        }

        let axis = match axis {
            Value::Literal(a) => a,
            Value::Deferred(r) => {
                return Err(ShapeError::NotConstant {
                    op: "concatenate",
                    what: "axis",
                    value: r.to_string(),
                });
            }
        };
        let resolved = if axis < 0 { axis + rank as i64 } else { axis };
        if resolved < 0 || resolved >= rank as i64 {
            return Err(ShapeError::AxisOutOfRange { axis, rank });
        }
        let axis = resolved as usize;

        let mut joined: i64 = 0;
        let mut verification = Verification::Verified;
        for shape in shapes {
            verification = verification.meet(shape.verification);
            match shape.get(axis as i64)?.as_literal() {
                Some(size) => {
                    joined = joined
                        .checked_add(size)
                        .ok_or(ShapeError::Overflow { op: "concatenate" })?;
                }
                None => {
                    return Err(ShapeError::UnresolvedDim {
                        op: "concatenate",
                        axis,
                    });
                }
            }
        }

        let mut dims = vec![Dim::Constant(joined); rank];
        for x in 0..rank {
            if x == axis {
                continue;
            }
            // first value wins; later values must agree structurally
            let dim = first.get(x as i64)?;
            for shape in &shapes[1..] {
                let other = shape.get(x as i64)?;
                if other != dim {
                    return Err(ShapeError::DimMismatch {
                        axis: x,
                        left: dim.to_string(),
                        right: other.to_string(),
                    });
                }
            }
            dims[x] = dim;
        }

        Ok(Shape::known(dims, verification))
    }

    /// The shape of a tensor slice described by per-axis `bounds`.
    ///
    /// A range bound resizes its axis to `stop - start` (defaults: 0
    /// and the axis size; negative values resolve against the axis
    /// size, which must then be a constant). A scalar bound elides its
    /// axis. Axes beyond the bounds carry through unchanged.
    pub fn slice(&self, bounds: &[Bound]) -> Result<Shape, ShapeError> {
        let rank = self.require_rank("slice")?;

        let mut dims = Vec::new();
        for (axis, bound) in bounds.iter().enumerate() {
            match bound {
                // indexing, not slicing: the axis is elided
                Bound::At(_) => {}
                Bound::Within(range) => {
                    if range.step.is_some() {
                        return Err(ShapeError::StepUnsupported);
                    }
                    let start = match &range.start {
                        None => Value::Literal(0),
                        Some(v) => v.clone(),
                    };
                    let stop = match &range.stop {
                        None => self.get(axis as i64)?.into(),
                        Some(v) => v.clone(),
                    };
                    let (Some(start), Some(stop)) = (start.as_literal(), stop.as_literal())
                    else {
                        return Err(ShapeError::NotConstant {
                            op: "slice",
                            what: "bound",
                            value: format!("{}:{}", start, stop),
                        });
                    };
                    let (start, stop) = if start < 0 || stop < 0 {
                        let size = self.get(axis as i64)?.as_literal().ok_or(
                            ShapeError::UnresolvedDim { op: "slice", axis },
                        )?;
                        (
                            if start < 0 { size + start } else { start },
                            if stop < 0 { size + stop } else { stop },
                        )
                    } else {
                        (start, stop)
                    };
                    dims.push(Dim::constant(stop - start)?);
                }
            }
        }
        for axis in bounds.len()..rank {
            dims.push(self.get(axis as i64)?);
        }

        Ok(Shape::known(dims, self.verification))
    }

    /// The shape with its axes rearranged.
    ///
    /// Without a permutation the axis order is reversed (known rank
    /// required). A literal permutation must name each axis exactly
    /// once; negative entries count from the end. A deferred
    /// permutation fails.
    pub fn transpose(&self, permutation: Option<Permutation>) -> Result<Shape, ShapeError> {
        match permutation {
            None => {
                let mut dims = self.known_dims("transpose")?.to_vec();
                dims.reverse();
                Ok(Shape::known(dims, self.verification))
            }
            Some(Permutation::Deferred(r)) => Err(ShapeError::NotConstant {
                op: "transpose",
                what: "permutation",
                value: r.to_string(),
            }),
            Some(Permutation::Literal(permutation)) => match &self.repr {
                Repr::Known { dims, .. } => {
                    let rank = dims.len();
                    if permutation.len() != rank {
                        return Err(ShapeError::InvalidPermutation { permutation, rank });
                    }
                    let mut seen = vec![false; rank];
                    let mut out = Vec::with_capacity(rank);
                    for &axis in &permutation {
                        let resolved = if axis < 0 { axis + rank as i64 } else { axis };
                        if resolved < 0 || resolved >= rank as i64 || seen[resolved as usize] {
                            return Err(ShapeError::InvalidPermutation {
                                permutation: permutation.clone(),
                                rank,
                            });
                        }
                        seen[resolved as usize] = true;
                        out.push(dims[resolved as usize].clone());
                    }
                    Ok(Shape::known(out, self.verification))
                }
                Repr::Deferred(_) => {
                    // rank unknown: each permuted axis resolves to a
                    // deferred lookup, but the axis count is now known
                    let mut out = Vec::with_capacity(permutation.len());
                    for &axis in &permutation {
                        out.push(self.get(axis)?);
                    }
                    Ok(Shape::known(out, self.verification))
                }
            },
        }
    }

    /// The shape with a size-1 axis inserted at `axis` (appended when
    /// `axis` is `None`). Requires a known rank and a constant axis.
    ///
    /// A negative position names an existing axis from the end and the
    /// new axis is inserted before it, so `expand(Some(-1))` on
    /// `[2, 3]` yields `[2, 1, 3]`; appending is spelled `None` (or
    /// `rank` itself).
    pub fn expand(&self, axis: Option<Value>) -> Result<Shape, ShapeError> {
        let mut dims = self.known_dims("expand")?.to_vec();
        let rank = dims.len();
        let at = match axis {
            None => rank,
            Some(Value::Literal(axis)) => {
                let resolved = if axis < 0 { axis + rank as i64 } else { axis };
                if resolved < 0 || resolved > rank as i64 {
                    return Err(ShapeError::AxisOutOfRange { axis, rank });
                }
                resolved as usize
            }
            Some(Value::Deferred(r)) => {
                return Err(ShapeError::NotConstant {
                    op: "expand",
                    what: "axis",
                    value: r.to_string(),
                });
            }
        };
        dims.insert(at, Dim::Constant(1));
        Ok(Shape::known(dims, self.verification))
    }

    /// The shape remaining after reducing over `axis` (over every axis
    /// when `None`). With `keepdims` the reduced axis keeps size 1,
    /// otherwise it is removed; reducing over every axis without
    /// `keepdims` collapses to the rank-0 shape, even when this
    /// shape's rank is unknown.
    pub fn reduce(&self, axis: Option<Value>, keepdims: bool) -> Result<Shape, ShapeError> {
        let axis = match axis {
            None => {
                if !keepdims {
                    return Ok(Shape::known(Vec::new(), self.verification));
                }
                let dims = self.known_dims("reduce")?;
                return Ok(Shape::known(
                    vec![Dim::Constant(1); dims.len()],
                    self.verification,
                ));
            }
            Some(Value::Literal(axis)) => axis,
            Some(Value::Deferred(r)) => {
                return Err(ShapeError::NotConstant {
                    op: "reduce",
                    what: "axis",
                    value: r.to_string(),
                });
            }
        };

        let dims = self.known_dims("reduce")?;
        let rank = dims.len();
        let resolved = if axis < 0 { axis + rank as i64 } else { axis };
        if resolved < 0 || resolved >= rank as i64 {
            return Err(ShapeError::AxisOutOfRange { axis, rank });
        }
        let reduced = resolved as usize;

        let out = if keepdims {
            dims.iter()
                .enumerate()
                .map(|(x, dim)| {
                    if x == reduced {
                        Dim::Constant(1)
                    } else {
                        dim.clone()
                    }
                })
                .collect()
        } else {
            dims.iter()
                .enumerate()
                .filter(|(x, _)| *x != reduced)
                .map(|(_, dim)| dim.clone())
                .collect()
        };
        Ok(Shape::known(out, self.verification))
    }

    /// The shape formed by appending `other`'s axes after this
    /// shape's. Both ranks must be known.
    pub fn append(&self, other: &Shape) -> Result<Shape, ShapeError> {
        let mut dims = self.known_dims("append")?.to_vec();
        dims.extend_from_slice(other.known_dims("append")?);
        Ok(Shape::known(dims, self.verification.meet(other.verification)))
    }
}

fn resolve_index(index: Option<i64>, len: i64, default: i64) -> i64 {
    match index {
        None => default,
        Some(i) if i < 0 => len + i,
        Some(i) => i,
    }
}

fn checked_product(dims: impl Iterator<Item = i64>) -> Option<i64> {
    let mut product: i64 = 1;
    for dim in dims {
        product = product.checked_mul(dim)?;
    }
    Some(product)
}

fn format_dims(dims: &[i64]) -> String {
    let rendered: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
    format!("[{}]", rendered.join(", "))
}

impl TryFrom<Vec<u64>> for Shape {
    type Error = DimError;

    fn try_from(dims: Vec<u64>) -> Result<Self, DimError> {
        let dims = dims
            .into_iter()
            .map(Dim::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Shape::new(dims))
    }
}

impl TryFrom<&[u64]> for Shape {
    type Error = DimError;

    fn try_from(dims: &[u64]) -> Result<Self, DimError> {
        let dims = dims
            .iter()
            .copied()
            .map(Dim::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Shape::new(dims))
    }
}

impl<const N: usize> TryFrom<[u64; N]> for Shape {
    type Error = DimError;

    fn try_from(dims: [u64; N]) -> Result<Self, DimError> {
        Shape::try_from(&dims[..])
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.repr {
            Repr::Known { dims, .. } => {
                write!(f, "[")?;
                for (x, dim) in dims.iter().enumerate() {
                    if x > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", dim)?;
                }
                write!(f, "]")
            }
            Repr::Deferred(origin) => write!(f, "{}", origin),
        }
    }
}

/// Construct a rank-known shape from literal dimension sizes.
///
/// ```
/// let s = ndshape::shape!(2, 3, 4);
/// assert_eq!(s.rank(), Some(3));
/// assert_eq!(s.size(), Some(24));
/// ```
#[macro_export]
macro_rules! shape {
    ( $( $dim:expr ),* $(,)? ) => {
        $crate::Shape::new(vec![ $(
            $crate::Dim::constant(
                i64::try_from($dim).expect("dimension size does not fit in i64"),
            )
            .expect("dimension size must be non-negative")
        ),* ])
    };
}

/// A half-open axis range with optional bounds and an optional step.
/// Convertible from native Rust ranges. Operations reject a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub start: Option<Value>,
    pub stop: Option<Value>,
    pub step: Option<Value>,
}

impl Range {
    pub fn new(start: Option<Value>, stop: Option<Value>) -> Self {
        Self {
            start,
            stop,
            step: None,
        }
    }

    pub fn with_step(mut self, step: Value) -> Self {
        self.step = Some(step);
        self
    }
}

impl From<std::ops::Range<i64>> for Range {
    fn from(r: std::ops::Range<i64>) -> Self {
        Self::new(Some(Value::Literal(r.start)), Some(Value::Literal(r.end)))
    }
}

impl From<std::ops::RangeFrom<i64>> for Range {
    fn from(r: std::ops::RangeFrom<i64>) -> Self {
        Self::new(Some(Value::Literal(r.start)), None)
    }
}

impl From<std::ops::RangeTo<i64>> for Range {
    fn from(r: std::ops::RangeTo<i64>) -> Self {
        Self::new(None, Some(Value::Literal(r.end)))
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::new(None, None)
    }
}

/// One per-axis bound of a tensor slice: a scalar index (the axis is
/// elided from the result) or a range (the axis is resized).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    At(Value),
    Within(Range),
}

impl From<i64> for Bound {
    fn from(index: i64) -> Self {
        Bound::At(Value::Literal(index))
    }
}

impl From<Value> for Bound {
    fn from(index: Value) -> Self {
        Bound::At(index)
    }
}

impl From<Range> for Bound {
    fn from(range: Range) -> Self {
        Bound::Within(range)
    }
}

impl From<std::ops::Range<i64>> for Bound {
    fn from(r: std::ops::Range<i64>) -> Self {
        Bound::Within(r.into())
    }
}

impl From<std::ops::RangeFrom<i64>> for Bound {
    fn from(r: std::ops::RangeFrom<i64>) -> Self {
        Bound::Within(r.into())
    }
}

impl From<std::ops::RangeTo<i64>> for Bound {
    fn from(r: std::ops::RangeTo<i64>) -> Self {
        Bound::Within(r.into())
    }
}

impl From<std::ops::RangeFull> for Bound {
    fn from(r: std::ops::RangeFull) -> Self {
        Bound::Within(r.into())
    }
}

/// A reshape target: a literal dimension list (where `-1` marks the
/// single axis to infer) or a deferred shape reference.
#[derive(Debug, Clone, PartialEq)]
pub enum NewShape {
    Literal(Vec<i64>),
    Deferred(OpaqueRef),
}

impl From<Vec<i64>> for NewShape {
    fn from(dims: Vec<i64>) -> Self {
        NewShape::Literal(dims)
    }
}

impl From<&[i64]> for NewShape {
    fn from(dims: &[i64]) -> Self {
        NewShape::Literal(dims.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for NewShape {
    fn from(dims: [i64; N]) -> Self {
        NewShape::Literal(dims.to_vec())
    }
}

impl From<OpaqueRef> for NewShape {
    fn from(r: OpaqueRef) -> Self {
        NewShape::Deferred(r)
    }
}

/// An axis permutation: a literal axis list or a deferred reference
/// (which every operation rejects).
#[derive(Debug, Clone, PartialEq)]
pub enum Permutation {
    Literal(Vec<i64>),
    Deferred(OpaqueRef),
}

impl From<Vec<i64>> for Permutation {
    fn from(axes: Vec<i64>) -> Self {
        Permutation::Literal(axes)
    }
}

impl From<&[i64]> for Permutation {
    fn from(axes: &[i64]) -> Self {
        Permutation::Literal(axes.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for Permutation {
    fn from(axes: [i64; N]) -> Self {
        Permutation::Literal(axes.to_vec())
    }
}

impl From<OpaqueRef> for Permutation {
    fn from(r: OpaqueRef) -> Self {
        Permutation::Deferred(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deferred_dim(handle: &str) -> Dim {
        Dim::Deferred(OpaqueRef::new(handle).child(PathSeg::Shape).child(PathSeg::Axis(0)))
    }

    #[test]
    fn test_basic() {
        let s = shape!(2, 3, 4);
        assert_eq!(s.rank(), Some(3));
        assert_eq!(s.rank_value(), Value::Literal(3));
        assert_eq!(s.size(), Some(24));
        assert_eq!(s.to_string(), "[2, 3, 4]");
        assert_eq!(s.verification(), Verification::Verified);
        assert!(!s.is_deferred());

        let empty = shape!();
        assert_eq!(empty.rank(), Some(0));
        assert_eq!(empty.size(), Some(1));
    }

    #[test]
    fn test_shape_macro_rejects_negative() {
        let negative: i64 = -1;
        let result = std::panic::catch_unwind(|| shape!(2, negative));
        assert!(result.is_err());
    }

    #[test]
    fn test_try_from_unsigned() {
        let s = Shape::try_from(vec![2u64, 3]).unwrap();
        assert_eq!(s, shape!(2, 3));

        // an oversized unsigned size must not wrap into a negative dim
        assert!(matches!(
            Shape::try_from(vec![2u64, u64::MAX]),
            Err(DimError::Oversize { .. })
        ));
    }

    #[test]
    fn test_deferred_shape() {
        let s = Shape::of("t0");
        assert_eq!(s.rank(), None);
        assert_eq!(s.size(), None);
        assert!(s.is_deferred());
        assert_eq!(s.to_string(), "t0.shape");
        assert_eq!(
            s.rank_value(),
            Value::Deferred(OpaqueRef::new("t0").child(PathSeg::Shape).child(PathSeg::Len))
        );
    }

    #[test]
    fn test_get() {
        let s = shape!(2, 3, 4);
        assert_eq!(s.get(0).unwrap(), Dim::Constant(2));
        assert_eq!(s.get(2).unwrap(), Dim::Constant(4));
        assert_eq!(s.get(-1).unwrap(), Dim::Constant(4));
        assert_eq!(s.get(-3).unwrap(), Dim::Constant(2));

        assert!(matches!(
            s.get(3).unwrap_err(),
            ShapeError::IndexOutOfRange { index: 3, rank: 3 }
        ));
        assert!(matches!(
            s.get(-4).unwrap_err(),
            ShapeError::IndexOutOfRange { index: -4, rank: 3 }
        ));
    }

    #[test]
    fn test_get_deferred() {
        // literal index into a rank-unknown shape defers with provenance
        let s = Shape::of("x");
        let dim = s.get(1).unwrap();
        assert_eq!(dim, Dim::Deferred(OpaqueRef::new("x").child(PathSeg::Shape).child(PathSeg::Axis(1))));
        assert_eq!(dim.to_string(), "x.shape[1]");

        // deferred index into a literal shape defers as well
        let s = shape!(2, 3);
        let axis = OpaqueRef::new("i");
        let dim = s.get(Value::Deferred(axis)).unwrap();
        assert!(!dim.is_literal());
        assert_eq!(dim.to_string(), "[2, 3][i]");
    }

    #[test]
    fn test_range_full_is_identity() {
        let s = shape!(2, 3, 4);
        assert_eq!(s.range(..).unwrap(), s);
        assert_eq!(s.range(..).unwrap().range(..).unwrap(), s);
    }

    #[test]
    fn test_range() {
        let s = shape!(2, 3, 4, 5);
        assert_eq!(s.range(1..3).unwrap(), shape!(3, 4));
        assert_eq!(s.range(-2..).unwrap(), shape!(4, 5));
        assert_eq!(s.range(..2).unwrap(), shape!(2, 3));
        assert_eq!(s.range(2..2).unwrap(), shape!());

        // rank-unknown source: a deferred sub-sequence reference
        let d = Shape::of("t0").range(1..3).unwrap();
        assert!(d.is_deferred());
        assert_eq!(d.to_string(), "t0.shape[1:3]");

        assert!(matches!(
            s.range(Range::new(None, None).with_step(Value::Literal(2)))
                .unwrap_err(),
            ShapeError::StepUnsupported
        ));
    }

    #[test]
    fn test_broadcast_literal() {
        let a = shape!(5, 1, 4);
        let b = shape!(3, 1);
        let out = a.broadcast(&b).unwrap();
        assert_eq!(out, shape!(5, 3, 4));
        assert_eq!(out.verification(), Verification::Verified);

        // commutative for literal inputs, rank is the max of the two
        assert_eq!(b.broadcast(&a).unwrap(), out);
        assert_eq!(out.rank(), Some(3));

        // scalar broadcasts against anything
        assert_eq!(shape!().broadcast(&a).unwrap(), a);
    }

    #[test]
    fn test_broadcast_incompatible() {
        let a = shape!(3, 2);
        let b = shape!(4, 2);
        let err = a.broadcast(&b).unwrap_err();
        assert!(matches!(err, ShapeError::IncompatibleDims { axis: 0, .. }));
        assert_eq!(err.kind(), ErrorKind::IncompatibleShapes);
    }

    #[test]
    fn test_broadcast_deferred() {
        let sym = Shape::new(vec![deferred_dim("t0"), Dim::Constant(2)]);

        // one side is 1: the deferred side wins, fully checked
        let out = sym.broadcast(&shape!(1, 2)).unwrap();
        assert_eq!(out.verification(), Verification::Verified);
        assert!(!out.get(0).unwrap().is_literal());

        // one side is a non-1 constant: the constant wins, assumed
        let out = sym.broadcast(&shape!(7, 2)).unwrap();
        assert_eq!(out.get(0).unwrap(), Dim::Constant(7));
        assert!(out.verification().is_assumed());

        // both deferred: not resolvable locally
        let other = Shape::new(vec![deferred_dim("t1"), Dim::Constant(2)]);
        let err = sym.broadcast(&other).unwrap_err();
        assert!(matches!(err, ShapeError::UnresolvedDim { op: "broadcast", axis: 0 }));
        assert_eq!(err.kind(), ErrorKind::InsufficientInfo);

        // rank-unknown inputs are a hard failure
        assert!(matches!(
            Shape::of("t0").broadcast(&shape!(2)).unwrap_err(),
            ShapeError::UnknownRank { op: "broadcast" }
        ));
    }

    #[test]
    fn test_broadcast_assumed_propagates() {
        let sym = Shape::new(vec![deferred_dim("t0"), Dim::Constant(2)]);
        let assumed = sym.broadcast(&shape!(7, 2)).unwrap();
        let derived = assumed.transpose(None).unwrap();
        assert!(derived.verification().is_assumed());
    }

    #[test]
    fn test_reshape_roundtrip() {
        let s = shape!(2, 3, 4);
        let flat = s.reshape([24]).unwrap();
        assert_eq!(flat, shape!(24));
        assert_eq!(flat.reshape([2, 3, 4]).unwrap(), s);
    }

    #[test]
    fn test_reshape_infer() {
        let s = shape!(2, 3, 4, 1);
        assert_eq!(s.reshape([3, -1]).unwrap(), shape!(3, 8));
        assert_eq!(s.reshape([-1]).unwrap(), shape!(24));

        // non-exact division cannot be satisfied
        assert!(matches!(
            s.reshape([5, -1]).unwrap_err(),
            ShapeError::ReshapeMismatch { .. }
        ));
    }

    #[test]
    fn test_reshape_invalid() {
        let s = shape!(2, 3, 4);
        assert!(matches!(
            s.reshape([-1, -1, 6]).unwrap_err(),
            ShapeError::MultipleUnknown { .. }
        ));
        assert!(matches!(
            s.reshape([-2, 12]).unwrap_err(),
            ShapeError::InvalidSize { axis: 0, size: -2 }
        ));
        assert!(matches!(
            s.reshape([5, 5]).unwrap_err(),
            ShapeError::ReshapeMismatch { .. }
        ));
    }

    #[test]
    fn test_reshape_deferred() {
        // deferred target: the result's shape is itself symbolic
        let s = shape!(2, 3);
        let r = OpaqueRef::new("target");
        let out = s.reshape(r.clone()).unwrap();
        assert_eq!(out, Shape::deferred(r));

        // non-constant source accepts a literal target unverified
        let sym = Shape::new(vec![deferred_dim("t0"), Dim::Constant(4)]);
        let out = sym.reshape([2, 2]).unwrap();
        assert_eq!(out, shape!(2, 2));
        assert!(out.verification().is_assumed());

        // but cannot infer an unknown axis without a known element count
        assert!(matches!(
            sym.reshape([2, -1]).unwrap_err(),
            ShapeError::CannotInfer { .. }
        ));
        assert!(matches!(
            Shape::of("t0").reshape([2, -1]).unwrap_err(),
            ShapeError::CannotInfer { .. }
        ));
    }

    #[test]
    fn test_concatenate() {
        let out =
            Shape::concatenate(&[shape!(5, 8), shape!(5, 4)], Value::Literal(1)).unwrap();
        assert_eq!(out, shape!(5, 12));

        // negative axis normalizes against the rank
        let out =
            Shape::concatenate(&[shape!(5, 8), shape!(5, 4)], Value::Literal(-1)).unwrap();
        assert_eq!(out, shape!(5, 12));

        let err =
            Shape::concatenate(&[shape!(5, 8), shape!(4, 8)], Value::Literal(1)).unwrap_err();
        assert!(matches!(err, ShapeError::DimMismatch { axis: 0, .. }));
    }

    #[test]
    fn test_concatenate_agreeing_deferred() {
        // identical deferred dims on a non-concat axis agree structurally
        let a = Shape::new(vec![deferred_dim("t0"), Dim::Constant(8)]);
        let b = Shape::new(vec![deferred_dim("t0"), Dim::Constant(4)]);
        let out = Shape::concatenate(&[a, b], Value::Literal(1)).unwrap();
        assert_eq!(out.get(1).unwrap(), Dim::Constant(12));
        assert!(!out.get(0).unwrap().is_literal());
    }

    #[test]
    fn test_concatenate_failures() {
        assert!(matches!(
            Shape::concatenate(&[], Value::Literal(0)).unwrap_err(),
            ShapeError::EmptyConcat
        ));
        assert!(matches!(
            Shape::concatenate(&[shape!(2, 3), shape!(2)], Value::Literal(0)).unwrap_err(),
            ShapeError::RankMismatch { left: 2, right: 1 }
        ));
        assert!(matches!(
            Shape::concatenate(
                &[shape!(2, 3)],
                Value::Deferred(OpaqueRef::new("axis"))
            )
            .unwrap_err(),
            ShapeError::NotConstant { op: "concatenate", what: "axis", .. }
        ));
        assert!(matches!(
            Shape::concatenate(&[shape!(2, 3)], Value::Literal(2)).unwrap_err(),
            ShapeError::AxisOutOfRange { axis: 2, rank: 2 }
        ));

        // the joined axis must be constant in every input
        let sym = Shape::new(vec![Dim::Constant(5), deferred_dim("t0")]);
        assert!(matches!(
            Shape::concatenate(&[shape!(5, 8), sym], Value::Literal(1)).unwrap_err(),
            ShapeError::UnresolvedDim { op: "concatenate", axis: 1 }
        ));

        // the joined size must not overflow
        let huge = Shape::new(vec![Dim::Constant(i64::MAX)]);
        let err = Shape::concatenate(&[huge.clone(), huge], Value::Literal(0)).unwrap_err();
        assert!(matches!(err, ShapeError::Overflow { op: "concatenate" }));
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn test_slice() {
        let s = shape!(10);
        assert_eq!(s.slice(&[(-3i64..).into()]).unwrap(), shape!(3));

        let s = shape!(2, 5, 7);
        // scalar bound elides the axis; trailing axes carry through
        assert_eq!(s.slice(&[1i64.into()]).unwrap(), shape!(5, 7));
        assert_eq!(s.slice(&[1i64.into(), (1i64..4).into()]).unwrap(), shape!(3, 7));
        assert_eq!(s.slice(&[(..).into()]).unwrap(), s);
    }

    #[test]
    fn test_slice_failures() {
        let s = shape!(10);
        assert!(matches!(
            s.slice(&[Bound::Within(
                Range::new(None, None).with_step(Value::Literal(2))
            )])
            .unwrap_err(),
            ShapeError::StepUnsupported
        ));
        assert!(matches!(
            s.slice(&[Bound::Within(Range::new(
                Some(Value::Deferred(OpaqueRef::new("start"))),
                None,
            ))])
            .unwrap_err(),
            ShapeError::NotConstant { op: "slice", what: "bound", .. }
        ));

        // a negative bound needs the axis size to be constant
        let sym = Shape::new(vec![deferred_dim("t0")]);
        assert!(matches!(
            sym.slice(&[Bound::Within(Range::new(
                Some(Value::Literal(-3)),
                Some(Value::Literal(5)),
            ))])
            .unwrap_err(),
            ShapeError::UnresolvedDim { op: "slice", axis: 0 }
        ));

        assert!(matches!(
            Shape::of("t0").slice(&[(..).into()]).unwrap_err(),
            ShapeError::UnknownRank { op: "slice" }
        ));
    }

    #[test]
    fn test_transpose() {
        let s = shape!(2, 3, 4);
        assert_eq!(s.transpose(None).unwrap(), shape!(4, 3, 2));
        assert_eq!(
            s.transpose(Some([2, 0, 1].into())).unwrap(),
            shape!(4, 2, 3)
        );
        assert_eq!(
            s.transpose(Some([-1, 0, 1].into())).unwrap(),
            shape!(4, 2, 3)
        );

        assert!(matches!(
            s.transpose(Some([0, 1].into())).unwrap_err(),
            ShapeError::InvalidPermutation { rank: 3, .. }
        ));
        assert!(matches!(
            s.transpose(Some([0, 0, 1].into())).unwrap_err(),
            ShapeError::InvalidPermutation { .. }
        ));
        assert!(matches!(
            s.transpose(Some(OpaqueRef::new("perm").into())).unwrap_err(),
            ShapeError::NotConstant { op: "transpose", what: "permutation", .. }
        ));
        assert!(matches!(
            Shape::of("t0").transpose(None).unwrap_err(),
            ShapeError::UnknownRank { op: "transpose" }
        ));
    }

    #[test]
    fn test_transpose_deferred_with_permutation() {
        // a literal permutation of a rank-unknown shape pins the rank
        let out = Shape::of("t0").transpose(Some([1, 0].into())).unwrap();
        assert_eq!(out.rank(), Some(2));
        assert_eq!(out.get(0).unwrap().to_string(), "t0.shape[1]");
    }

    #[test]
    fn test_expand() {
        let s = shape!(2, 3);
        assert_eq!(s.expand(None).unwrap(), shape!(2, 3, 1));
        assert_eq!(s.expand(Some(Value::Literal(0))).unwrap(), shape!(1, 2, 3));
        assert_eq!(s.expand(Some(Value::Literal(1))).unwrap(), shape!(2, 1, 3));
        assert_eq!(s.expand(Some(Value::Literal(2))).unwrap(), shape!(2, 3, 1));

        // negative axis names an existing axis; insertion lands before it
        assert_eq!(s.expand(Some(Value::Literal(-1))).unwrap(), shape!(2, 1, 3));
        assert_eq!(s.expand(Some(Value::Literal(-2))).unwrap(), shape!(1, 2, 3));

        assert!(matches!(
            s.expand(Some(Value::Literal(4))).unwrap_err(),
            ShapeError::AxisOutOfRange { axis: 4, rank: 2 }
        ));
        assert!(matches!(
            s.expand(Some(Value::Deferred(OpaqueRef::new("axis")))).unwrap_err(),
            ShapeError::NotConstant { op: "expand", what: "axis", .. }
        ));
        assert!(matches!(
            Shape::of("t0").expand(None).unwrap_err(),
            ShapeError::UnknownRank { op: "expand" }
        ));
    }

    #[test]
    fn test_reduce() {
        let s = shape!(2, 3, 4);
        assert_eq!(s.reduce(Some(Value::Literal(1)), true).unwrap(), shape!(2, 1, 4));
        assert_eq!(s.reduce(Some(Value::Literal(1)), false).unwrap(), shape!(2, 4));
        assert_eq!(s.reduce(Some(Value::Literal(-1)), false).unwrap(), shape!(2, 3));
        assert_eq!(s.reduce(None, false).unwrap(), shape!());
        assert_eq!(s.reduce(None, true).unwrap(), shape!(1, 1, 1));

        // reducing everything away needs no rank at all
        assert_eq!(Shape::of("t0").reduce(None, false).unwrap(), shape!());

        assert!(matches!(
            s.reduce(Some(Value::Literal(3)), false).unwrap_err(),
            ShapeError::AxisOutOfRange { axis: 3, rank: 3 }
        ));
        assert!(matches!(
            s.reduce(Some(Value::Deferred(OpaqueRef::new("axis"))), false)
                .unwrap_err(),
            ShapeError::NotConstant { op: "reduce", what: "axis", .. }
        ));
    }

    #[test]
    fn test_append() {
        let a = shape!(2, 3);
        let b = shape!(4);
        assert_eq!(a.append(&b).unwrap(), shape!(2, 3, 4));
        assert!(matches!(
            a.append(&Shape::of("t0")).unwrap_err(),
            ShapeError::UnknownRank { op: "append" }
        ));
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ShapeError::IndexOutOfRange { index: 3, rank: 2 }.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            ShapeError::UnknownRank { op: "broadcast" }.kind(),
            ErrorKind::InsufficientInfo
        );
        assert_eq!(
            ShapeError::ReshapeMismatch {
                from: "[2]".to_string(),
                to: "[3]".to_string()
            }
            .kind(),
            ErrorKind::IncompatibleShapes
        );
        assert_eq!(ShapeError::StepUnsupported.kind(), ErrorKind::Unsupported);
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = shape!(2, 3);
        let encoded = serde_json::to_string(&s).unwrap();
        let decoded: Shape = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, s);

        let d = Shape::of("t0");
        let encoded = serde_json::to_string(&d).unwrap();
        let decoded: Shape = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, d);
    }
}
