//! Batches of points and tangent vectors.
//!
//! Every geometric operation works on a leading batch axis: a single point is
//! a batch of length one. Operations taking several batched arguments
//! broadcast them the way array libraries do: batch sizes must agree, or one
//! of them must be 1, in which case its single element is reused for every
//! position of the other.
//!
//! Shape normalization happens once, at the top of each batched operation,
//! through [`broadcast_len`]; the kernels then run element by element,
//! optionally in parallel (see [`crate::config`]).

use crate::{
    config::get_parallel_config,
    error::{ManifoldError, Result},
    types::DVector,
};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::ops::Index;

/// A non-empty batch of array elements.
///
/// `Batch<E>` is the Rust counterpart of an array of shape
/// `(n_points, *point_shape)`: the batch length is the leading axis and each
/// element carries the point shape.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<E>", into = "Vec<E>", bound(serialize = "E: Clone + serde::Serialize"))
)]
pub struct Batch<E> {
    elements: Vec<E>,
}

impl<E> Batch<E> {
    /// Creates a batch from its elements.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `elements` is empty.
    pub fn new(elements: Vec<E>) -> Result<Self> {
        if elements.is_empty() {
            return Err(ManifoldError::invalid_parameter(
                "a batch must contain at least one element",
            ));
        }
        Ok(Self { elements })
    }

    /// Creates a batch of length one.
    pub fn single(element: E) -> Self {
        Self {
            elements: vec![element],
        }
    }

    /// Number of elements along the batch axis.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false`: batches are never empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether this batch has length one and therefore broadcasts.
    #[inline]
    pub fn is_single(&self) -> bool {
        self.elements.len() == 1
    }

    /// Returns the element at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&E> {
        self.elements.get(index)
    }

    /// Returns the element used at position `index` after broadcasting.
    ///
    /// A batch of length one yields its only element for every index.
    #[inline]
    pub fn broadcast_get(&self, index: usize) -> &E {
        if self.is_single() {
            &self.elements[0]
        } else {
            &self.elements[index]
        }
    }

    /// First element of the batch.
    pub fn first(&self) -> &E {
        &self.elements[0]
    }

    /// Iterates over the elements.
    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.elements.iter()
    }

    /// Borrows the elements as a slice.
    pub fn as_slice(&self) -> &[E] {
        &self.elements
    }

    /// Consumes the batch and returns its elements.
    pub fn into_vec(self) -> Vec<E> {
        self.elements
    }

    /// Concatenates batches along the batch axis.
    pub fn concat(batches: Vec<Self>) -> Result<Self> {
        Self::new(batches.into_iter().flat_map(Self::into_vec).collect())
    }

    /// Applies a fallible kernel to every element.
    pub fn map<R, F>(&self, f: F) -> Result<Batch<R>>
    where
        E: Sync,
        R: Send,
        F: Fn(&E) -> Result<R> + Sync + Send,
    {
        let elements = run_indexed(self.len(), |i| f(&self.elements[i]))?;
        Ok(Batch { elements })
    }
}

impl<E: nalgebra::Scalar> Batch<E> {
    /// Converts a batch of scalars into an `(n, 1)` column.
    pub fn into_column(self) -> DVector<E> {
        DVector::from_vec(self.elements)
    }
}

impl<E> Index<usize> for Batch<E> {
    type Output = E;

    fn index(&self, index: usize) -> &Self::Output {
        &self.elements[index]
    }
}

impl<E> TryFrom<Vec<E>> for Batch<E> {
    type Error = ManifoldError;

    fn try_from(elements: Vec<E>) -> Result<Self> {
        Self::new(elements)
    }
}

impl<E> From<Batch<E>> for Vec<E> {
    fn from(batch: Batch<E>) -> Self {
        batch.elements
    }
}

impl<E> IntoIterator for Batch<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a Batch<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

/// Validates the broadcast rule and returns the common batch length.
///
/// Every size must equal the largest one or be 1.
///
/// # Errors
///
/// Returns `BroadcastMismatch` naming the first two incompatible sizes.
pub fn broadcast_len(sizes: &[usize]) -> Result<usize> {
    let mut common: Option<usize> = None;
    for &size in sizes {
        if size == 1 {
            continue;
        }
        match common {
            None => common = Some(size),
            Some(existing) if existing != size => {
                tracing::debug!(left = existing, right = size, "batch sizes do not broadcast");
                return Err(ManifoldError::broadcast_mismatch(existing, size));
            }
            Some(_) => {}
        }
    }
    Ok(common.unwrap_or(1))
}

/// Applies a pointwise kernel to two broadcast batches.
pub fn broadcast_map2<A, B, R, F>(a: &Batch<A>, b: &Batch<B>, f: F) -> Result<Batch<R>>
where
    A: Sync,
    B: Sync,
    R: Send,
    F: Fn(&A, &B) -> Result<R> + Sync + Send,
{
    let n = broadcast_len(&[a.len(), b.len()])?;
    let elements = run_indexed(n, |i| f(a.broadcast_get(i), b.broadcast_get(i)))?;
    Ok(Batch { elements })
}

/// Applies a pointwise kernel to three broadcast batches.
pub fn broadcast_map3<A, B, C, R, F>(
    a: &Batch<A>,
    b: &Batch<B>,
    c: &Batch<C>,
    f: F,
) -> Result<Batch<R>>
where
    A: Sync,
    B: Sync,
    C: Sync,
    R: Send,
    F: Fn(&A, &B, &C) -> Result<R> + Sync + Send,
{
    let n = broadcast_len(&[a.len(), b.len(), c.len()])?;
    let elements = run_indexed(n, |i| {
        f(a.broadcast_get(i), b.broadcast_get(i), c.broadcast_get(i))
    })?;
    Ok(Batch { elements })
}

/// Evaluates `f` on `0..n`, in parallel when the configuration allows it.
fn run_indexed<R, F>(n: usize, f: F) -> Result<Vec<R>>
where
    R: Send,
    F: Fn(usize) -> Result<R> + Sync + Send,
{
    let parallel = get_parallel_config().should_parallelize_batch(n);
    tracing::trace!(batch_len = n, parallel, "evaluating batch");

    #[cfg(feature = "parallel")]
    {
        if parallel {
            return (0..n).into_par_iter().map(&f).collect();
        }
    }

    (0..n).map(f).collect()
}
