// Validation of names that arrive in request paths and query strings.
// Everything here runs before any lookup so bad input never reaches the
// snapshot, the usage command or the LED backend.

use crate::error::{PoolwatchError, Result};

/// Longest pool or device name accepted
const MAX_NAME_LENGTH: usize = 255;

/// Pool names that collide with vdev keywords
const RESERVED_POOL_PREFIXES: &[&str] = &["mirror", "raidz", "draid", "spare"];

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// Validates a pool name.
///
/// Accepted grammar:
/// - starts with an ASCII letter
/// - followed by ASCII letters, digits, `_`, `-`, `.` or `:`
/// - at most 255 bytes
/// - not `log`, not starting with `mirror`, `raidz`, `draid` or `spare`,
///   and not `c` followed by a digit (reserved for device names)
pub fn validate_pool_name(name: &str) -> Result<()> {
    let invalid = || PoolwatchError::InvalidPoolName(name.to_string());

    if name.is_empty() || name.len() > MAX_NAME_LENGTH {
        return Err(invalid());
    }

    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return Err(invalid()),
    }
    if !chars.all(is_name_char) {
        return Err(invalid());
    }

    if name == "log" || RESERVED_POOL_PREFIXES.iter().any(|p| name.starts_with(p)) {
        return Err(invalid());
    }

    let bytes = name.as_bytes();
    if bytes[0] == b'c' && bytes.get(1).is_some_and(u8::is_ascii_digit) {
        return Err(invalid());
    }

    Ok(())
}

/// Validates a device name for the locate endpoint and returns it without
/// a leading `/dev/`.
///
/// Accepted grammar: 1 to 255 bytes of ASCII letters, digits, `_`, `-`,
/// `.` or `:`, and never `.` or `..`. Slashes are rejected, so the name
/// cannot escape the backend's device directory.
pub fn validate_device_name(name: &str) -> Result<&str> {
    let short = name.strip_prefix("/dev/").unwrap_or(name);

    if short.is_empty()
        || short.len() > MAX_NAME_LENGTH
        || short == "."
        || short == ".."
        || !short.chars().all(is_name_char)
    {
        return Err(PoolwatchError::InvalidDevice(name.to_string()));
    }

    Ok(short)
}

/// Parses the `state` parameter of the locate endpoint.
pub fn parse_locate_state(state: &str) -> Result<bool> {
    match state {
        "on" => Ok(true),
        "off" => Ok(false),
        other => Err(PoolwatchError::InvalidLocateState(other.to_string())),
    }
}
