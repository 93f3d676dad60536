//! Client-side shape algebra for lazily built tensor expression graphs.
//!
//! A client composing tensor expressions against a remote execution
//! engine often knows some dimensions as plain constants while others
//! exist only as references the engine resolves at execution time.
//! This crate models that split directly: a [`Value`] or [`Dim`] is
//! either a literal or a deferred [`OpaqueRef`], and a [`Shape`] is a
//! sequence of dimensions whose rank may itself be unknown locally.
//!
//! Every operation resolves as much as it can eagerly — catching
//! incompatible broadcasts, bad reshapes, and out-of-range axes before
//! anything is sent to the engine — and falls back to a deferred
//! result where the inputs leave no other choice. The two documented
//! optimistic shortcuts tag their results [`Verification::Assumed`]
//! so callers can tell a checked shape from a promised one.
//!
//! ```
//! use ndshape::shape;
//!
//! let a = shape!(5, 1, 4);
//! let b = shape!(3, 1);
//! assert_eq!(a.broadcast(&b).unwrap(), shape!(5, 3, 4));
//!
//! let s = shape!(2, 3, 4).reshape([3, -1]).unwrap();
//! assert_eq!(s, shape!(3, 8));
//! ```

mod dim;
mod shape;
mod value;

/// The size of one tensor axis: a constant or a deferred reference.
pub use crate::dim::Dim;
/// Error constructing a dimension value.
pub use crate::dim::DimError;
/// One per-axis bound of a tensor slice.
pub use crate::shape::Bound;
/// The failure classes of the shape algebra.
pub use crate::shape::ErrorKind;
/// A reshape target dimension list.
pub use crate::shape::NewShape;
/// An axis permutation argument.
pub use crate::shape::Permutation;
/// A half-open axis range with optional bounds.
pub use crate::shape::Range;
/// An ordered sequence of per-axis sizes.
pub use crate::shape::Shape;
/// Errors arising from shape operations.
pub use crate::shape::ShapeError;
/// Whether a shape was fully checked at construction time.
pub use crate::shape::Verification;
/// An opaque engine-side reference: handle plus access path.
pub use crate::value::OpaqueRef;
/// One step in an access path.
pub use crate::value::PathSeg;
/// A scalar that is either a local constant or engine-resolved.
pub use crate::value::Value;
