// src/utils/size.rs

//! Size string parsing for run arguments.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{AppError, Result};

fn byte_size_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?i)(\d+)\s*([kmgtp]?)(i?b)?$").expect("size pattern is valid")
    })
}

fn memory_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)([bkKmMgGtTPEZY%])?$").expect("memory pattern is valid")
    })
}

/// Parse a byte size such as `500`, `64K`, `10MB` or `1GiB` (binary units).
///
/// Zero is rejected: a shard bound must allow at least one byte.
pub fn parse_byte_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let caps = byte_size_re().captures(trimmed).ok_or_else(|| {
        AppError::invalid_arguments(format!("'{}' is not a byte size", input))
    })?;

    let value: u64 = caps[1]
        .parse()
        .map_err(|_| AppError::invalid_arguments(format!("'{}' is too large", input)))?;
    let shift = match caps[2].to_ascii_lowercase().as_str() {
        "" => 0,
        "k" => 10,
        "m" => 20,
        "g" => 30,
        "t" => 40,
        _ => 50,
    };

    let bytes = value
        .checked_mul(1u64 << shift)
        .ok_or_else(|| AppError::invalid_arguments(format!("'{}' is too large", input)))?;
    if bytes == 0 {
        return Err(AppError::invalid_arguments("size must be positive"));
    }
    Ok(bytes)
}

/// Check a working-memory budget in `sort -S` notation (`512M`, `2G`, `40%`).
///
/// The value is forwarded to the orderer verbatim; only its shape is checked.
pub fn validate_memory_limit(input: &str) -> Result<&str> {
    let caps = memory_re().captures(input).ok_or_else(|| {
        AppError::invalid_arguments(format!("'{}' is not a memory limit", input))
    })?;

    // sort -S takes whole numbers only
    if caps[1].bytes().all(|b| b == b'0') {
        return Err(AppError::invalid_arguments("memory limit must be positive"));
    }
    Ok(input)
}
