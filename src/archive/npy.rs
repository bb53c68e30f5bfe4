//! Minimal `.npy` decoding for the entries `ndarray-npy` cannot read.
//!
//! `ndarray-npy` covers numeric and boolean element types. Feature name
//! catalogs are stored by numpy as fixed-width string arrays (`<U*` for
//! unicode, `|S*` for bytes), so those are decoded here from the raw
//! header and payload.
//!
//! Numeric entries are read through [`ReadNpyExt`], trying candidate element
//! types in order and moving on only when the stored descriptor differs.

use ndarray::{Array, Dimension};
use ndarray_npy::{ReadNpyError, ReadNpyExt, ReadableElement};

const MAGIC: &[u8] = b"\x93NUMPY";

/// Parsed `.npy` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NpyHeader {
    /// numpy dtype descriptor, e.g. `<U5`
    pub descr: String,
    /// Column-major payload
    pub fortran_order: bool,
    /// Array shape
    pub shape: Vec<usize>,
    /// Byte offset of the payload
    pub data_offset: usize,
}

impl NpyHeader {
    /// Number of elements described by the shape, `None` on overflow.
    pub fn element_count(&self) -> Option<usize> {
        self.shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
    }
}

/// Parse the header of an in-memory `.npy` file.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<NpyHeader, String> {
    if bytes.len() < 10 || !bytes.starts_with(MAGIC) {
        return Err("missing .npy magic string".to_string());
    }

    let major = bytes[6];
    let (len, start) = match major {
        1 => (u16::from_le_bytes([bytes[8], bytes[9]]) as usize, 10),
        2 | 3 => {
            if bytes.len() < 12 {
                return Err("truncated .npy header".to_string());
            }
            let len = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
            (len, 12)
        }
        v => return Err(format!("unsupported .npy format version {v}")),
    };

    let end = start + len;
    let text = bytes
        .get(start..end)
        .ok_or_else(|| "truncated .npy header".to_string())?;
    let text = std::str::from_utf8(text).map_err(|e| format!("header is not UTF-8: {e}"))?;

    let descr = quoted_value(text, "descr")?;
    let fortran_order = match raw_value(text, "fortran_order")? {
        v if v.starts_with("True") => true,
        v if v.starts_with("False") => false,
        v => return Err(format!("invalid fortran_order value: {v}")),
    };
    let shape = parse_shape(raw_value(text, "shape")?)?;

    Ok(NpyHeader {
        descr,
        fortran_order,
        shape,
        data_offset: end,
    })
}

fn raw_value<'a>(header: &'a str, key: &str) -> Result<&'a str, String> {
    let pattern = format!("'{key}':");
    let pos = header
        .find(&pattern)
        .ok_or_else(|| format!("header has no '{key}' entry"))?;
    Ok(header[pos + pattern.len()..].trim_start())
}

fn quoted_value(header: &str, key: &str) -> Result<String, String> {
    let rest = raw_value(header, key)?;
    let rest = rest
        .strip_prefix('\'')
        .ok_or_else(|| format!("'{key}' is not a quoted string"))?;
    let close = rest
        .find('\'')
        .ok_or_else(|| format!("unterminated '{key}' value"))?;
    Ok(rest[..close].to_string())
}

fn parse_shape(rest: &str) -> Result<Vec<usize>, String> {
    let rest = rest
        .strip_prefix('(')
        .ok_or_else(|| "shape is not a tuple".to_string())?;
    let close = rest
        .find(')')
        .ok_or_else(|| "unterminated shape tuple".to_string())?;

    rest[..close]
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|e| format!("invalid shape dimension '{s}': {e}"))
        })
        .collect()
}

/// Decode a 1D fixed-width string array (`<U*`, `>U*` or `|S*`).
pub(crate) fn read_string_array(bytes: &[u8]) -> Result<Vec<String>, String> {
    let header = parse_header(bytes)?;
    if header.shape.len() != 1 {
        return Err(format!(
            "expected a 1D string array, got shape {:?}",
            header.shape
        ));
    }

    // numpy writes `np.array([])` as float64; an empty catalog is still empty
    if header.shape[0] == 0 {
        return Ok(Vec::new());
    }

    let descr = header.descr.as_str();
    let (order, kind_width) = match descr.chars().next() {
        Some(c @ ('<' | '>' | '|' | '=')) => (c, &descr[1..]),
        _ => ('=', descr),
    };
    let kind = kind_width
        .chars()
        .next()
        .ok_or_else(|| format!("empty dtype descriptor '{descr}'"))?;
    let width: usize = kind_width[kind.len_utf8()..]
        .parse()
        .map_err(|_| format!("unsupported dtype '{descr}' for a name array"))?;

    let count = header
        .element_count()
        .ok_or_else(|| format!("shape {:?} overflows", header.shape))?;
    let item_size = match kind {
        'U' => width.checked_mul(4),
        'S' => Some(width),
        _ => return Err(format!("unsupported dtype '{descr}' for a name array")),
    }
    .ok_or_else(|| format!("item width overflows in dtype '{descr}'"))?;

    let available = bytes.len().saturating_sub(header.data_offset);
    let payload_len = count
        .checked_mul(item_size)
        .filter(|&len| len <= available)
        .ok_or_else(|| format!("payload shorter than {count} × {item_size} bytes"))?;
    let payload = &bytes[header.data_offset..header.data_offset + payload_len];

    if item_size == 0 {
        // zero-width items carry no bytes, so the shape alone cannot be checked
        if count > available {
            return Err(format!("{count} zero-width names exceed the entry size"));
        }
        return Ok(vec![String::new(); count]);
    }

    payload
        .chunks_exact(item_size)
        .map(|item| match kind {
            'U' => decode_utf32(item, order == '>'),
            _ => decode_bytes(item),
        })
        .collect()
}

fn decode_utf32(item: &[u8], big_endian: bool) -> Result<String, String> {
    let mut out = String::new();
    for unit in item.chunks_exact(4) {
        let raw = [unit[0], unit[1], unit[2], unit[3]];
        let code = if big_endian {
            u32::from_be_bytes(raw)
        } else {
            u32::from_le_bytes(raw)
        };
        if code == 0 {
            break;
        }
        let ch = char::from_u32(code).ok_or_else(|| format!("invalid code point {code:#x}"))?;
        out.push(ch);
    }
    Ok(out)
}

fn decode_bytes(item: &[u8]) -> Result<String, String> {
    let end = item.iter().position(|&b| b == 0).unwrap_or(item.len());
    String::from_utf8(item[..end].to_vec()).map_err(|e| format!("name is not UTF-8: {e}"))
}

/// Read a numeric array as element type `A`.
///
/// Returns `Ok(None)` when the stored dtype is a different element type.
pub(crate) fn read_as<A, D>(bytes: &[u8]) -> Result<Option<Array<A, D>>, ReadNpyError>
where
    A: ReadableElement,
    D: Dimension,
{
    match Array::<A, D>::read_npy(bytes) {
        Ok(array) => Ok(Some(array)),
        Err(ReadNpyError::WrongDescriptor(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Ix1;

    fn npy_bytes(descr: &str, shape: &str, payload: &[u8]) -> Vec<u8> {
        let mut header =
            format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}");
        // pad so that magic + len + header is a multiple of 64, newline-terminated
        let unpadded = MAGIC.len() + 4 + header.len() + 1;
        header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
        header.push('\n');

        let mut out = MAGIC.to_vec();
        out.extend_from_slice(&[1, 0]);
        out.extend_from_slice(&(header.len() as u16).to_le_bytes());
        out.extend_from_slice(header.as_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn utf32(names: &[&str], width: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for name in names {
            let mut chars: Vec<char> = name.chars().collect();
            chars.resize(width, '\0');
            for c in chars {
                out.extend_from_slice(&(c as u32).to_le_bytes());
            }
        }
        out
    }

    #[test]
    fn test_parse_header() {
        let bytes = npy_bytes("<f4", "(3, 4, 5)", &[]);
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.descr, "<f4");
        assert!(!header.fortran_order);
        assert_eq!(header.shape, vec![3, 4, 5]);
        assert_eq!(header.data_offset % 64, 0);
    }

    #[test]
    fn test_parse_scalar_and_1d_shapes() {
        assert_eq!(parse_shape("(), }").unwrap(), Vec::<usize>::new());
        assert_eq!(parse_shape("(7,), }").unwrap(), vec![7]);
    }

    #[test]
    fn test_rejects_missing_magic() {
        assert!(parse_header(b"not an npy file at all").is_err());
    }

    #[test]
    fn test_read_unicode_names() {
        let bytes = npy_bytes("<U5", "(2,)", &utf32(&["wind", "cloud"], 5));
        let names = read_string_array(&bytes).unwrap();
        assert_eq!(names, vec!["wind", "cloud"]);
    }

    #[test]
    fn test_read_non_ascii_names() {
        let bytes = npy_bytes("<U4", "(1,)", &utf32(&["Δt°"], 4));
        assert_eq!(read_string_array(&bytes).unwrap(), vec!["Δt°"]);
    }

    #[test]
    fn test_read_byte_names() {
        let bytes = npy_bytes("|S4", "(2,)", b"areaice\0");
        assert_eq!(read_string_array(&bytes).unwrap(), vec!["area", "ice"]);
    }

    #[test]
    fn test_rejects_object_arrays() {
        let bytes = npy_bytes("|O", "(2,)", &[]);
        assert!(read_string_array(&bytes).is_err());
    }

    #[test]
    fn test_rejects_truncated_payload() {
        let bytes = npy_bytes("<U5", "(3,)", &utf32(&["wind"], 5));
        assert!(read_string_array(&bytes).is_err());
    }

    #[test]
    fn test_empty_catalog_of_any_dtype() {
        let bytes = npy_bytes("<f8", "(0,)", &[]);
        assert_eq!(read_string_array(&bytes).unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_huge_shape_is_an_error() {
        let bytes = npy_bytes("<U5", "(4611686018427387904,)", &utf32(&["wind"], 5));
        assert!(read_string_array(&bytes).is_err());

        let bytes = npy_bytes("<U0", "(4611686018427387904,)", &[]);
        assert!(read_string_array(&bytes).is_err());
    }

    #[test]
    fn test_element_count_overflow() {
        let header = NpyHeader {
            descr: "<f4".to_string(),
            fortran_order: false,
            shape: vec![usize::MAX, 2],
            data_offset: 64,
        };
        assert_eq!(header.element_count(), None);
        let header = NpyHeader {
            shape: vec![3, 4],
            ..header
        };
        assert_eq!(header.element_count(), Some(12));
    }

    #[test]
    fn test_read_as_skips_other_dtypes() {
        let payload: Vec<u8> = [5_i64, 10].iter().flat_map(|v| v.to_le_bytes()).collect();
        let bytes = npy_bytes("<i8", "(2,)", &payload);

        let as_float: Option<Array<f64, Ix1>> = read_as(&bytes).unwrap();
        assert!(as_float.is_none());

        let as_int: Array<i64, Ix1> = read_as(&bytes).unwrap().unwrap();
        assert_eq!(as_int.to_vec(), vec![5, 10]);
    }
}
