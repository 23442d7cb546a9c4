//! Typed array container
//!
//! [`TypedArray`] is the in-memory form of a stored array: a contiguous
//! row-major byte payload plus its shape and element type tag. It is how
//! arrays come back out of a dataset — the store itself only ever holds
//! `(bytes, metadata)` pairs.

mod dtype;

pub use dtype::{DataType, Element};

use bytes::Bytes;
use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension, IxDyn};

use crate::error::{Result, VaultError};

/// An n-dimensional numeric array backed by a raw contiguous buffer.
///
/// The payload is row-major with no header or padding. Typed access goes
/// through [`Element`]: zero-copy when the buffer happens to be aligned for
/// the element type, by copy otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    data: Bytes,
    shape: Vec<usize>,
    dtype: DataType,
}

impl TypedArray {
    /// Build an array from a flat vector of values in row-major order.
    ///
    /// Fails with `VaultError::Format` if `values.len()` does not match the
    /// product of `shape`.
    pub fn from_vec<T: Element>(shape: Vec<usize>, values: Vec<T>) -> Result<Self> {
        let expected = checked_num_elements(&shape)?;
        if values.len() != expected {
            return Err(VaultError::Format(format!(
                "shape {:?} requires {} elements, got {}",
                shape,
                expected,
                values.len()
            )));
        }
        let data = Bytes::from(bytemuck::cast_slice::<T, u8>(&values).to_vec());
        Ok(Self {
            data,
            shape,
            dtype: T::DTYPE,
        })
    }

    /// Build an array from any `ndarray` array, copying it into row-major
    /// (logical) order.
    pub fn from_ndarray<T, S, D>(array: &ArrayBase<S, D>) -> Self
    where
        T: Element,
        S: Data<Elem = T>,
        D: Dimension,
    {
        // Iteration order is logical (row-major) regardless of the array's
        // memory layout.
        let flat: Vec<T> = array.iter().copied().collect();
        Self {
            data: Bytes::from(bytemuck::cast_slice::<T, u8>(&flat).to_vec()),
            shape: array.shape().to_vec(),
            dtype: T::DTYPE,
        }
    }

    /// Wrap an existing raw payload without copying.
    ///
    /// Fails with `VaultError::Format` if the byte length does not equal
    /// `product(shape) × size_of(dtype)`.
    pub fn from_raw(data: Bytes, shape: Vec<usize>, dtype: DataType) -> Result<Self> {
        let expected = checked_num_elements(&shape)? * dtype.size_of();
        if data.len() != expected {
            return Err(VaultError::Format(format!(
                "payload is {} bytes, shape {:?} with dtype {} requires {}",
                data.len(),
                shape,
                dtype,
                expected
            )));
        }
        Ok(Self { data, shape, dtype })
    }

    /// Shape as an ordered sequence of dimension sizes
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Element type tag
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Total number of elements
    pub fn num_elements(&self) -> usize {
        self.shape.iter().product()
    }

    /// Payload length in bytes
    pub fn byte_len(&self) -> usize {
        self.data.len()
    }

    /// Raw row-major payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Cheap clone of the payload (shared, not copied)
    pub fn to_bytes(&self) -> Bytes {
        self.data.clone()
    }

    /// Zero-copy typed view of the payload as a flat slice.
    ///
    /// Fails with `DtypeMismatch` if `T` does not match the stored dtype, or
    /// with `Format` if the buffer is not aligned for `T` (use
    /// [`to_vec`](Self::to_vec) in that case).
    pub fn try_as_slice<T: Element>(&self) -> Result<&[T]> {
        self.check_dtype::<T>()?;
        bytemuck::try_cast_slice(&self.data).map_err(|e| {
            VaultError::Format(format!("payload not viewable as {}: {}", T::DTYPE, e))
        })
    }

    /// Copy the payload out as a typed vector, regardless of alignment.
    pub fn to_vec<T: Element>(&self) -> Result<Vec<T>> {
        self.check_dtype::<T>()?;
        // Length was validated at construction, so this cannot panic.
        Ok(bytemuck::pod_collect_to_vec(&self.data))
    }

    /// Zero-copy n-dimensional view over the payload.
    pub fn view<T: Element>(&self) -> Result<ArrayViewD<'_, T>> {
        let slice = self.try_as_slice::<T>()?;
        ArrayViewD::from_shape(IxDyn(&self.shape), slice)
            .map_err(|e| VaultError::Format(format!("shape {:?}: {}", self.shape, e)))
    }

    /// Owned n-dimensional copy of the payload.
    pub fn to_ndarray<T: Element>(&self) -> Result<ArrayD<T>> {
        let values = self.to_vec::<T>()?;
        ArrayD::from_shape_vec(IxDyn(&self.shape), values)
            .map_err(|e| VaultError::Format(format!("shape {:?}: {}", self.shape, e)))
    }

    fn check_dtype<T: Element>(&self) -> Result<()> {
        if self.dtype != T::DTYPE {
            return Err(VaultError::DtypeMismatch {
                expected: self.dtype,
                actual: T::DTYPE,
            });
        }
        Ok(())
    }
}

/// Element count for a shape, guarding against overflow on hostile metadata.
fn checked_num_elements(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| VaultError::Format(format!("shape {:?} overflows usize", shape)))
}
