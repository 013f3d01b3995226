//! Runtime support for the `#[ssz(size = "..")]` and `#[ssz(max = ..)]` field directives.
//!
//! A directive rewrites the schema of a field whose declared type is a nesting of `Vec`s,
//! without changing the Rust type: each comma-separated entry describes one nesting depth,
//! outermost first, with `n` giving vector semantics (exactly `n` elements) and `?` giving
//! list semantics. The element type is taken from the declared type's innermost element.
//! For example a `Vec<Vec<u8>>` field carrying `#[ssz(size = "?,32")]` serializes as a list
//! of 32-byte vectors.
//!
//! The derive macro parses the directive text at expansion time and bakes the result into the
//! generated implementation as a `&[SizeDim]` constant, so no directive interpretation happens
//! per call. The traits here mirror `Encode`/`Decode` with each method threading the
//! dimensions that remain beneath the current depth; once the dimension list is exhausted the
//! declared type's own schema applies.
//!
//! Vector dimensions follow the same policy as absent (null) values: a value shorter than the
//! declared count encodes its missing trailing elements as the element zero value, and a
//! longer value does not serialize the surplus, so the wire shape is always exactly the
//! declared schema. Decoding enforces the declared count.

use crate::decode::impls::decode_variable_length_items_with;
use crate::*;
use ethereum_types::{H160, H256, U128, U256};
use itertools::process_results;

/// One dimension of a size directive, outermost first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SizeDim {
    /// The dimension holds exactly this many elements.
    Vector(usize),
    /// The dimension holds any number of elements, optionally bounded by a maximum.
    List(Option<usize>),
}

/// Splits the outermost dimension from `dims`.
///
/// An exhausted dimension list means the declared type applies unchanged from this depth
/// down, which for a `Vec` is an unbounded list.
fn split_dims(dims: &[SizeDim]) -> (SizeDim, &[SizeDim]) {
    match dims.split_first() {
        Some((&dim, rest)) => (dim, rest),
        None => (SizeDim::List(None), &[]),
    }
}

/// Encoding against a rewritten dimension list. See the module docs.
pub trait SizedEncode: Encode {
    fn sized_is_fixed_len(dims: &[SizeDim]) -> bool;

    fn sized_fixed_len(dims: &[SizeDim]) -> usize;

    fn sized_bytes_len(&self, dims: &[SizeDim]) -> usize;

    fn sized_append(&self, dims: &[SizeDim], buf: &mut Vec<u8>);
}

/// Decoding against a rewritten dimension list. See the module docs.
pub trait SizedDecode: Decode {
    fn sized_is_fixed_len(dims: &[SizeDim]) -> bool;

    fn sized_fixed_len(dims: &[SizeDim]) -> usize;

    fn sized_from_ssz_bytes(bytes: &[u8], dims: &[SizeDim]) -> Result<Self, DecodeError>;
}

macro_rules! impl_sized_for_basic {
    ($type: ty) => {
        impl SizedEncode for $type {
            fn sized_is_fixed_len(_dims: &[SizeDim]) -> bool {
                <$type as Encode>::is_ssz_fixed_len()
            }

            fn sized_fixed_len(_dims: &[SizeDim]) -> usize {
                <$type as Encode>::ssz_fixed_len()
            }

            fn sized_bytes_len(&self, _dims: &[SizeDim]) -> usize {
                self.ssz_bytes_len()
            }

            fn sized_append(&self, _dims: &[SizeDim], buf: &mut Vec<u8>) {
                self.ssz_append(buf)
            }
        }

        impl SizedDecode for $type {
            fn sized_is_fixed_len(_dims: &[SizeDim]) -> bool {
                <$type as Decode>::is_ssz_fixed_len()
            }

            fn sized_fixed_len(_dims: &[SizeDim]) -> usize {
                <$type as Decode>::ssz_fixed_len()
            }

            fn sized_from_ssz_bytes(bytes: &[u8], _dims: &[SizeDim]) -> Result<Self, DecodeError> {
                Self::from_ssz_bytes(bytes)
            }
        }
    };
}

impl_sized_for_basic!(bool);
impl_sized_for_basic!(u8);
impl_sized_for_basic!(u16);
impl_sized_for_basic!(u32);
impl_sized_for_basic!(u64);
impl_sized_for_basic!(H160);
impl_sized_for_basic!(H256);
impl_sized_for_basic!(U128);
impl_sized_for_basic!(U256);

impl<T: SizedEncode + Default> SizedEncode for Vec<T> {
    fn sized_is_fixed_len(dims: &[SizeDim]) -> bool {
        match split_dims(dims) {
            (SizeDim::Vector(_), rest) => T::sized_is_fixed_len(rest),
            (SizeDim::List(_), _) => false,
        }
    }

    fn sized_fixed_len(dims: &[SizeDim]) -> usize {
        match split_dims(dims) {
            (SizeDim::Vector(n), rest) if T::sized_is_fixed_len(rest) => {
                n * T::sized_fixed_len(rest)
            }
            _ => BYTES_PER_LENGTH_OFFSET,
        }
    }

    fn sized_bytes_len(&self, dims: &[SizeDim]) -> usize {
        let (dim, rest) = split_dims(dims);

        let count = match dim {
            SizeDim::Vector(n) => n,
            SizeDim::List(_) => self.len(),
        };

        if T::sized_is_fixed_len(rest) {
            count * T::sized_fixed_len(rest)
        } else {
            let mut len = count * BYTES_PER_LENGTH_OFFSET;
            for i in 0..count {
                len += match self.get(i) {
                    Some(item) => item.sized_bytes_len(rest),
                    None => T::default().sized_bytes_len(rest),
                };
            }
            len
        }
    }

    fn sized_append(&self, dims: &[SizeDim], buf: &mut Vec<u8>) {
        let (dim, rest) = split_dims(dims);

        let count = match dim {
            SizeDim::Vector(n) => n,
            SizeDim::List(_) => self.len(),
        };

        if T::sized_is_fixed_len(rest) {
            buf.reserve(count * T::sized_fixed_len(rest));

            for i in 0..count {
                match self.get(i) {
                    Some(item) => item.sized_append(rest, buf),
                    None => T::default().sized_append(rest, buf),
                }
            }
        } else {
            let mut encoder = SszEncoder::container(buf, count * BYTES_PER_LENGTH_OFFSET);

            for i in 0..count {
                let zero;
                let item = match self.get(i) {
                    Some(item) => item,
                    None => {
                        zero = T::default();
                        &zero
                    }
                };

                encoder.append_parameterized(false, |buf| item.sized_append(rest, buf));
            }

            encoder.finalize();
        }
    }
}

impl<T: SizedDecode> SizedDecode for Vec<T> {
    fn sized_is_fixed_len(dims: &[SizeDim]) -> bool {
        match split_dims(dims) {
            (SizeDim::Vector(_), rest) => T::sized_is_fixed_len(rest),
            (SizeDim::List(_), _) => false,
        }
    }

    fn sized_fixed_len(dims: &[SizeDim]) -> usize {
        match split_dims(dims) {
            (SizeDim::Vector(n), rest) if T::sized_is_fixed_len(rest) => {
                n * T::sized_fixed_len(rest)
            }
            _ => BYTES_PER_LENGTH_OFFSET,
        }
    }

    fn sized_from_ssz_bytes(bytes: &[u8], dims: &[SizeDim]) -> Result<Self, DecodeError> {
        let (dim, rest) = split_dims(dims);

        let items = if T::sized_is_fixed_len(rest) {
            let elem_len = T::sized_fixed_len(rest);

            let num_items = bytes
                .len()
                .checked_div(elem_len)
                .ok_or(DecodeError::ZeroLengthItem)?;

            if num_items * elem_len != bytes.len() {
                return Err(DecodeError::InvalidByteLength {
                    len: bytes.len(),
                    expected: num_items * elem_len,
                });
            }

            process_results(
                bytes
                    .chunks(elem_len)
                    .map(|chunk| T::sized_from_ssz_bytes(chunk, rest)),
                |iter| iter.collect::<Vec<_>>(),
            )?
        } else {
            let max_len = match dim {
                SizeDim::List(max) => max,
                SizeDim::Vector(_) => None,
            };

            decode_variable_length_items_with(bytes, max_len, |slice| {
                T::sized_from_ssz_bytes(slice, rest)
            })?
        };

        match dim {
            SizeDim::Vector(n) if items.len() != n => Err(DecodeError::BytesInvalid(format!(
                "Vector of {} elements declared, {} decoded",
                n,
                items.len()
            ))),
            SizeDim::List(Some(max)) if items.len() > max => {
                Err(DecodeError::BytesInvalid(format!(
                    "List of {} elements exceeds maximum of {}",
                    items.len(),
                    max
                )))
            }
            _ => Ok(items),
        }
    }
}
