//! Resource limits applied while decoding untrusted bundle bytes.

use crate::error::{BundleError, BundleResult};
use serde::Deserialize;
use std::io::Read;

/// Resource limits for bundle decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    pub max_bundle_bytes: u64,
    pub max_decode_bytes: u64,
    pub max_resources: usize,
    pub max_path_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_bundle_bytes: 100_u64 * 1024 * 1024,
            max_decode_bytes: 1024_u64 * 1024 * 1024,
            max_resources: 10_000,
            max_path_len: 1024,
        }
    }
}

/// Partial overrides for `DecodeLimits`. Used for config JSON parsing.
/// Unknown keys cause deserialization to fail (deny_unknown_fields).
/// Merge with `DecodeLimits::default().apply(overrides)`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecodeLimitsOverrides {
    pub max_bundle_bytes: Option<u64>,
    pub max_decode_bytes: Option<u64>,
    pub max_resources: Option<usize>,
    pub max_path_len: Option<usize>,
}

impl DecodeLimits {
    /// Apply overrides onto these limits. Only `Some` values override.
    pub fn apply(self, overrides: DecodeLimitsOverrides) -> Self {
        Self {
            max_bundle_bytes: overrides.max_bundle_bytes.unwrap_or(self.max_bundle_bytes),
            max_decode_bytes: overrides.max_decode_bytes.unwrap_or(self.max_decode_bytes),
            max_resources: overrides.max_resources.unwrap_or(self.max_resources),
            max_path_len: overrides.max_path_len.unwrap_or(self.max_path_len),
        }
    }

    pub(crate) fn check_resource_count(&self, count: usize) -> BundleResult<()> {
        if count > self.max_resources {
            return Err(BundleError::LimitExceeded {
                limit: LIMIT_RESOURCES,
                max: self.max_resources as u64,
            });
        }
        Ok(())
    }

    pub(crate) fn check_path(&self, path: &str) -> BundleResult<()> {
        if path.len() > self.max_path_len {
            return Err(BundleError::LimitExceeded {
                limit: LIMIT_PATH_LENGTH,
                max: self.max_path_len as u64,
            });
        }
        Ok(())
    }

    /// Raw payload size is a lower bound on the decoded envelope size.
    pub(crate) fn check_decoded_len(&self, len: u64) -> BundleResult<()> {
        if len > self.max_decode_bytes {
            return Err(BundleError::LimitExceeded {
                limit: LIMIT_DECODE_BYTES,
                max: self.max_decode_bytes,
            });
        }
        Ok(())
    }
}

/// Error tag carried by `LimitReader` overflow errors on the compressed side.
pub(crate) const LIMIT_BUNDLE_BYTES: &str = "LimitBundleBytes";
/// Error tag carried by `LimitReader` overflow errors on the decompressed side.
pub(crate) const LIMIT_DECODE_BYTES: &str = "LimitDecodeBytes";
pub(crate) const LIMIT_RESOURCES: &str = "LimitResources";
pub(crate) const LIMIT_PATH_LENGTH: &str = "LimitPathLength";

/// A reader that limits the total number of bytes read and fails explicitly on overflow.
pub(crate) struct LimitReader<R> {
    inner: R,
    limit: u64,
    read: u64,
    error_tag: &'static str,
}

impl<R: Read> LimitReader<R> {
    pub(crate) fn new(inner: R, limit: u64, error_tag: &'static str) -> Self {
        Self {
            inner,
            limit,
            read: 0,
            error_tag,
        }
    }
}

impl<R: Read> Read for LimitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.read >= self.limit {
            // Only an overflow if the inner stream actually has more to give.
            let mut next = [0u8; 1];
            if self.inner.read(&mut next)? == 0 {
                return Ok(0);
            }
            return Err(std::io::Error::other(format!(
                "{}: exceeded limit of {} bytes",
                self.error_tag, self.limit
            )));
        }

        let max_to_read = (self.limit - self.read).min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.read += n as u64;

        Ok(n)
    }
}
