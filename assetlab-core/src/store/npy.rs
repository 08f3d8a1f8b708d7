//! NumPy `.npy` (format v1.0) encoding for raw `u8` arrays.
//!
//! Only `|u1` C-order arrays are written or read, which is all the image
//! datasets need. Files stay loadable with `numpy.load`.

use super::StoreError;

const MAGIC: &[u8] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// A dense, row-major `u8` array.
#[derive(Debug, Clone, PartialEq)]
pub struct U8Array {
    pub shape: Vec<usize>,
    pub data: Vec<u8>,
}

impl U8Array {
    /// Build an array, checking that `shape` accounts for every element.
    pub fn new(shape: Vec<usize>, data: Vec<u8>) -> Result<Self, StoreError> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(StoreError::Array(format!(
                "shape {shape:?} needs {expected} elements, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Row `i` of a 2-D array.
    pub fn row(&self, i: usize) -> Option<&[u8]> {
        let &[rows, cols] = self.shape.as_slice() else {
            return None;
        };
        (i < rows).then(|| &self.data[i * cols..(i + 1) * cols])
    }
}

fn shape_literal(shape: &[usize]) -> String {
    match shape {
        [n] => format!("({n},)"),
        dims => format!(
            "({})",
            dims.iter().map(|d| d.to_string()).collect::<Vec<_>>().join(", ")
        ),
    }
}

/// Encode `array` as `.npy` bytes.
pub fn encode(array: &U8Array) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '|u1', 'fortran_order': False, 'shape': {}, }}",
        shape_literal(&array.shape)
    );
    // magic(6) + version(2) + header_len(2) + header + '\n' must be 64-aligned
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.extend(std::iter::repeat(' ').take(padding));
    header.push('\n');

    let mut out = Vec::with_capacity(MAGIC.len() + 4 + header.len() + array.data.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&[1, 0]);
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    out.extend_from_slice(&array.data);
    out
}

/// Decode `.npy` bytes written by [`encode`] (or by NumPy for a `|u1` array).
pub fn decode(bytes: &[u8]) -> Result<U8Array, StoreError> {
    let bad = |msg: &str| StoreError::Array(format!("invalid npy: {msg}"));

    if bytes.len() < 10 || &bytes[..6] != MAGIC {
        return Err(bad("missing magic"));
    }
    if bytes[6] != 1 {
        return Err(bad("unsupported version"));
    }
    let header_len = u16::from_le_bytes([bytes[8], bytes[9]]) as usize;
    let data_start = 10 + header_len;
    let header = bytes
        .get(10..data_start)
        .and_then(|h| std::str::from_utf8(h).ok())
        .ok_or_else(|| bad("truncated header"))?;

    if !header.contains("'descr': '|u1'") {
        return Err(bad("dtype is not u8"));
    }
    if header.contains("'fortran_order': True") {
        return Err(bad("fortran order not supported"));
    }

    let shape_start = header
        .find("'shape': (")
        .map(|i| i + "'shape': (".len())
        .ok_or_else(|| bad("no shape"))?;
    let shape_end = header[shape_start..]
        .find(')')
        .map(|i| shape_start + i)
        .ok_or_else(|| bad("unterminated shape"))?;
    let shape = header[shape_start..shape_end]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>().map_err(|_| bad("non-integer dimension")))
        .collect::<Result<Vec<_>, _>>()?;

    U8Array::new(shape, bytes[data_start..].to_vec())
}
