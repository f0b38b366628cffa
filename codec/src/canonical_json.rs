//! Canonical JSON: object keys sorted, no insignificant whitespace.
//!
//! Action payloads are arbitrary JSON, so their bytes must not depend on the
//! order a peer happened to build its maps in.

use serde_json::Value;

use crate::error::CodecError;

/// Serialize `value` canonically.
pub fn to_canonical_bytes(value: &Value) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    write_value(value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_scalar(&Value::String(key.clone()), out)?;
                out.push(b':');
                write_value(&map[key.as_str()], out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(item, out)?;
            }
            out.push(b']');
        }
        scalar => write_scalar(scalar, out)?,
    }
    Ok(())
}

fn write_scalar(value: &Value, out: &mut Vec<u8>) -> Result<(), CodecError> {
    serde_json::to_writer(&mut *out, value).map_err(|e| CodecError::Data(e.to_string()))
}
