//! Array byte codec
//!
//! Serializes arrays to contiguous raw bytes plus a JSON metadata record, and
//! reconstructs [`TypedArray`] views from the pair. The byte form carries no
//! header: it is only decodable together with its metadata.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::array::{DataType, TypedArray};
use crate::error::Result;

/// Per-array metadata, stored next to the payload as a JSON object with
/// exactly the fields `shape` and `dtype`, e.g.
/// `{"shape":[4,4],"dtype":"float32"}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ArrayMeta {
    pub shape: Vec<usize>,
    pub dtype: DataType,
}

impl ArrayMeta {
    /// Metadata describing `array`
    pub fn of(array: &TypedArray) -> Self {
        Self {
            shape: array.shape().to_vec(),
            dtype: array.dtype(),
        }
    }
}

/// Serialize an array's values to a contiguous row-major byte buffer.
///
/// No padding, no header; reversible only with the shape/dtype metadata
/// supplied separately.
pub fn encode_array(array: &TypedArray) -> Bytes {
    array.to_bytes()
}

/// Reconstruct an array over `bytes` without copying the payload.
///
/// Fails with `VaultError::Format` if the byte length does not match
/// `product(shape) × element size`.
pub fn decode_array(bytes: Bytes, meta: &ArrayMeta) -> Result<TypedArray> {
    TypedArray::from_raw(bytes, meta.shape.clone(), meta.dtype)
}

/// Encode metadata as a JSON object
pub fn encode_metadata(meta: &ArrayMeta) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(meta)?)
}

/// Decode a JSON metadata object
pub fn decode_metadata(bytes: &[u8]) -> Result<ArrayMeta> {
    Ok(serde_json::from_slice(bytes)?)
}
