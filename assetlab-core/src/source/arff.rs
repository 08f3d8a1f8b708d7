//! Minimal ARFF reader for OpenML image datasets.
//!
//! Supports numeric and nominal attributes with dense or sparse `@data` rows.
//! Every non-target attribute is treated as a pixel; the target attribute is
//! the class label. Both are cast to `u8`. Entries a sparse row leaves out
//! take the attribute's zero: `0` when numeric, the first declared value when
//! nominal.

use super::SourceError;

/// Attribute declared in the ARFF header.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub nominal: Option<Vec<String>>,
}

/// Flat `rows × features` pixel matrix plus a parallel label vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub rows: usize,
    pub features: usize,
    pub pixels: Vec<u8>,
    pub labels: Vec<u8>,
}

/// Parse an ARFF document, using `target` as the label attribute.
pub fn parse(text: &str, target: &str) -> Result<ImageData, SourceError> {
    let mut attributes: Vec<Attribute> = Vec::new();
    let mut lines = text.lines().enumerate();

    // Header
    loop {
        let Some((_, line)) = lines.next() else {
            return Err(SourceError::Malformed("ARFF has no @data section".into()));
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }
        let lower = line.to_ascii_lowercase();
        if lower.starts_with("@data") {
            break;
        }
        if lower.starts_with("@attribute") {
            attributes.push(parse_attribute(&line["@attribute".len()..])?);
        }
    }

    let target_idx = attributes
        .iter()
        .position(|a| a.name.eq_ignore_ascii_case(target))
        .ok_or_else(|| SourceError::Malformed(format!("ARFF has no target attribute '{target}'")))?;
    let width = attributes.len();
    let features = width - 1;

    let mut pixels = Vec::new();
    let mut labels = Vec::new();
    let mut values: Vec<Option<&str>> = vec![None; width];

    for (line_no, line) in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') {
            continue;
        }

        values.iter_mut().for_each(|v| *v = None);
        if let Some(body) = line.strip_prefix('{') {
            let body = body.strip_suffix('}').ok_or_else(|| {
                SourceError::Malformed(format!("unterminated sparse row at line {}", line_no + 1))
            })?;
            for pair in body.split(',').map(str::trim).filter(|p| !p.is_empty()) {
                let (idx, val) = pair.split_once(char::is_whitespace).ok_or_else(|| {
                    SourceError::Malformed(format!("bad sparse entry '{pair}' at line {}", line_no + 1))
                })?;
                let idx: usize = idx.parse().map_err(|_| {
                    SourceError::Malformed(format!("bad sparse index '{idx}' at line {}", line_no + 1))
                })?;
                let slot = values.get_mut(idx).ok_or_else(|| {
                    SourceError::Malformed(format!("sparse index {idx} out of range at line {}", line_no + 1))
                })?;
                *slot = Some(val.trim());
            }
        } else {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() != width {
                return Err(SourceError::Malformed(format!(
                    "line {} has {} values, expected {width}",
                    line_no + 1,
                    fields.len()
                )));
            }
            for (slot, field) in values.iter_mut().zip(fields) {
                *slot = Some(field);
            }
        }

        for (i, (attribute, value)) in attributes.iter().zip(&values).enumerate() {
            // Sparse rows omit zeros, and a nominal zero is its first declared value.
            let raw = match value {
                Some(raw) => unquote(raw),
                None => implicit_zero(attribute, line_no)?,
            };
            let byte = decode_value(attribute, raw, line_no)?;
            if i == target_idx {
                labels.push(byte);
            } else {
                pixels.push(byte);
            }
        }
    }

    Ok(ImageData {
        rows: labels.len(),
        features,
        pixels,
        labels,
    })
}

fn parse_attribute(rest: &str) -> Result<Attribute, SourceError> {
    let rest = rest.trim();
    let (name, kind) = if let Some(quoted) = rest.strip_prefix('\'') {
        let end = quoted
            .find('\'')
            .ok_or_else(|| SourceError::Malformed(format!("unterminated attribute name: {rest}")))?;
        (&quoted[..end], quoted[end + 1..].trim())
    } else {
        rest.split_once(char::is_whitespace)
            .map(|(n, k)| (n, k.trim()))
            .ok_or_else(|| SourceError::Malformed(format!("attribute without type: {rest}")))?
    };

    let nominal = kind.strip_prefix('{').map(|body| {
        body.trim_end_matches('}')
            .split(',')
            .map(|v| unquote(v.trim()).to_string())
            .collect()
    });

    Ok(Attribute {
        name: name.to_string(),
        nominal,
    })
}

fn implicit_zero(attribute: &Attribute, line_no: usize) -> Result<&str, SourceError> {
    match &attribute.nominal {
        None => Ok("0"),
        Some(values) => values.first().map(String::as_str).ok_or_else(|| {
            SourceError::Malformed(format!(
                "nominal attribute '{}' has no values (line {})",
                attribute.name,
                line_no + 1
            ))
        }),
    }
}

/// Decode one cell to `u8`.
///
/// Nominal values must be declared. A declared value that reads as an integer
/// keeps that integer (the digit classes of image datasets); any other value
/// maps to its position in the declared list.
fn decode_value(attribute: &Attribute, raw: &str, line_no: usize) -> Result<u8, SourceError> {
    let Some(declared) = &attribute.nominal else {
        return to_u8(raw, line_no);
    };
    let position = declared.iter().position(|v| v == raw).ok_or_else(|| {
        SourceError::Malformed(format!(
            "value '{raw}' is not declared for '{}' at line {}",
            attribute.name,
            line_no + 1
        ))
    })?;
    if raw.parse::<f64>().is_ok() {
        return to_u8(raw, line_no);
    }
    u8::try_from(position).map_err(|_| {
        SourceError::Malformed(format!(
            "'{}' declares more than 256 values (line {})",
            attribute.name,
            line_no + 1
        ))
    })
}

fn unquote(v: &str) -> &str {
    v.trim_matches(|c| c == '\'' || c == '"')
}

fn to_u8(raw: &str, line_no: usize) -> Result<u8, SourceError> {
    let value: f64 = raw.parse().map_err(|_| {
        SourceError::Malformed(format!("non-numeric value '{raw}' at line {}", line_no + 1))
    })?;
    if value.fract() != 0.0 || !(0.0..=255.0).contains(&value) {
        return Err(SourceError::Malformed(format!(
            "value {value} at line {} does not fit in u8",
            line_no + 1
        )));
    }
    Ok(value as u8)
}
