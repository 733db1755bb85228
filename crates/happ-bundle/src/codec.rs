//! Binary codec: gzip(msgpack({manifest, resources})).
//!
//! Packing is byte-for-byte reproducible: the gzip header carries
//! `mtime = 0` and `OS = 255` and MessagePack maps keep field order.

use crate::error::{BundleError, BundleResult};
use crate::limits::{DecodeLimits, LimitReader, LIMIT_BUNDLE_BYTES, LIMIT_DECODE_BYTES};
use crate::resources::ResourceMap;
use bytes::Bytes;
use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use rmpv::Value;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use tracing::debug;

const MANIFEST_KEY: &str = "manifest";
const RESOURCES_KEY: &str = "resources";

/// Decoded but not yet interpreted bundle contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Unpacked {
    pub manifest: Value,
    pub resources: ResourceMap,
}

/// Serialize `{manifest, resources}` and gzip the result.
pub fn pack(manifest: &Value, resources: &ResourceMap) -> BundleResult<Vec<u8>> {
    let envelope = Value::Map(vec![
        (Value::from(MANIFEST_KEY), manifest.clone()),
        (Value::from(RESOURCES_KEY), resources.to_value()),
    ]);
    let msgpack = rmp_serde::to_vec_named(&envelope)
        .map_err(|e| BundleError::corrupt(format!("msgpack encode: {}", e)))?;

    let mut encoder = GzBuilder::new()
        .mtime(0)
        .operating_system(255)
        .write(Vec::new(), Compression::best());
    encoder
        .write_all(&msgpack)
        .map_err(|e| BundleError::corrupt(format!("gzip encode: {}", e)))?;
    let packed = encoder
        .finish()
        .map_err(|e| BundleError::corrupt(format!("gzip encode: {}", e)))?;

    debug!(
        decoded_bytes = msgpack.len(),
        packed_bytes = packed.len(),
        resources = resources.len(),
        "packed bundle"
    );
    Ok(packed)
}

/// Gunzip and decode bundle bytes with default limits.
pub fn unpack(bytes: &[u8]) -> BundleResult<Unpacked> {
    unpack_with_limits(bytes, &DecodeLimits::default())
}

/// Gunzip and decode bundle bytes with explicit limits.
pub fn unpack_with_limits(bytes: &[u8], limits: &DecodeLimits) -> BundleResult<Unpacked> {
    let reader = LimitReader::new(bytes, limits.max_bundle_bytes, LIMIT_BUNDLE_BYTES);
    let decoder = GzDecoder::new(reader);
    let mut limited = LimitReader::new(decoder, limits.max_decode_bytes, LIMIT_DECODE_BYTES);

    let mut msgpack = Vec::new();
    limited
        .read_to_end(&mut msgpack)
        .map_err(|e| classify_read_error(e, limits))?;

    let envelope: Value = rmp_serde::from_slice(&msgpack)?;
    let mut entries = match envelope {
        Value::Map(entries) => entries,
        other => {
            return Err(BundleError::corrupt(format!(
                "expected top-level map, found {}",
                value_type(&other)
            )))
        }
    };

    let manifest = take_entry(&mut entries, MANIFEST_KEY)
        .ok_or_else(|| BundleError::corrupt("missing 'manifest' entry"))?;
    let resources = take_entry(&mut entries, RESOURCES_KEY)
        .ok_or_else(|| BundleError::corrupt("missing 'resources' entry"))?;
    let resources = resources_from_value(resources, limits)?;

    debug!(
        packed_bytes = bytes.len(),
        decoded_bytes = msgpack.len(),
        resources = resources.len(),
        "unpacked bundle"
    );
    Ok(Unpacked {
        manifest,
        resources,
    })
}

/// Encode a typed value as a MessagePack structured value (maps keep field names).
pub(crate) fn to_value<T: Serialize>(value: &T) -> BundleResult<Value> {
    let bytes = rmp_serde::to_vec_named(value)
        .map_err(|e| BundleError::corrupt(format!("msgpack encode: {}", e)))?;
    Ok(rmp_serde::from_slice(&bytes)?)
}

/// Decode a typed value from a MessagePack structured value.
pub(crate) fn from_value<T: DeserializeOwned>(value: &Value) -> BundleResult<T> {
    let bytes = rmp_serde::to_vec_named(value)
        .map_err(|e| BundleError::corrupt(format!("msgpack encode: {}", e)))?;
    Ok(rmp_serde::from_slice(&bytes)?)
}

pub(crate) fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Nil => "nil",
        Value::Boolean(_) => "boolean",
        Value::Integer(_) => "integer",
        Value::F32(_) | Value::F64(_) => "float",
        Value::String(_) => "string",
        Value::Binary(_) => "binary",
        Value::Array(_) => "array",
        Value::Map(_) => "map",
        Value::Ext(..) => "ext",
    }
}

fn take_entry(entries: &mut Vec<(Value, Value)>, key: &str) -> Option<Value> {
    let index = entries.iter().position(|(k, _)| k.as_str() == Some(key))?;
    Some(entries.swap_remove(index).1)
}

fn resources_from_value(value: Value, limits: &DecodeLimits) -> BundleResult<ResourceMap> {
    let entries = match value {
        Value::Map(entries) => entries,
        other => {
            return Err(BundleError::corrupt(format!(
                "expected 'resources' map, found {}",
                value_type(&other)
            )))
        }
    };

    limits.check_resource_count(entries.len())?;

    let mut resources = ResourceMap::new();
    for (key, value) in entries {
        let path = match key {
            Value::String(s) => s.into_str().ok_or_else(|| {
                BundleError::corrupt("resource path is not valid UTF-8")
            })?,
            other => {
                return Err(BundleError::corrupt(format!(
                    "resource path must be a string, found {}",
                    value_type(&other)
                )))
            }
        };
        limits.check_path(&path)?;
        let bytes = match value {
            Value::Binary(data) => Bytes::from(data),
            other => {
                return Err(BundleError::corrupt(format!(
                    "resource '{}' must be binary, found {}",
                    path,
                    value_type(&other)
                )))
            }
        };
        if resources.insert(path.clone(), bytes).is_some() {
            return Err(BundleError::corrupt(format!(
                "duplicate resource path '{}'",
                path
            )));
        }
    }
    Ok(resources)
}

fn classify_read_error(err: std::io::Error, limits: &DecodeLimits) -> BundleError {
    let message = err.to_string();
    if message.contains(LIMIT_BUNDLE_BYTES) {
        BundleError::LimitExceeded {
            limit: LIMIT_BUNDLE_BYTES,
            max: limits.max_bundle_bytes,
        }
    } else if message.contains(LIMIT_DECODE_BYTES) {
        BundleError::LimitExceeded {
            limit: LIMIT_DECODE_BYTES,
            max: limits.max_decode_bytes,
        }
    } else {
        BundleError::corrupt(format!("gzip decode: {}", message))
    }
}
