use crate::error::{RhttpError, Result};

/// Parses sizes like `100KB`, `1.5M` or `512` into bytes.
///
/// `unlimited` (any case) yields `None`.
pub fn parse_size_bytes(s: &str) -> Result<Option<usize>> {
    let raw = s.trim();
    let lower = raw.to_ascii_lowercase();
    if lower == "unlimited" {
        return Ok(None);
    }

    let split = lower
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(lower.len());
    let (number_str, unit_str) = lower.split_at(split);
    let invalid = || RhttpError::Config(format!("invalid size '{raw}'; expected e.g. '100KB' or 'unlimited'"));

    let number: f64 = number_str.parse().map_err(|_| invalid())?;
    let multiplier: f64 = match unit_str.trim() {
        "" | "b" => 1.0,
        "k" | "kb" | "kib" => 1024.0,
        "m" | "mb" | "mib" => 1024.0 * 1024.0,
        "g" | "gb" | "gib" => 1024.0 * 1024.0 * 1024.0,
        _ => return Err(invalid()),
    };

    let bytes = (number * multiplier).round();
    if !bytes.is_finite() || bytes > usize::MAX as f64 {
        return Err(invalid());
    }
    Ok(Some(bytes as usize))
}

#[cfg(test)]
mod tests {
    use super::parse_size_bytes;

    #[test]
    fn parses_units() {
        assert_eq!(parse_size_bytes("100KB").unwrap(), Some(102_400));
        assert_eq!(parse_size_bytes("1.5M").unwrap(), Some(1_572_864));
        assert_eq!(parse_size_bytes("512").unwrap(), Some(512));
        assert_eq!(parse_size_bytes(" 2 kb ").unwrap(), Some(2048));
    }

    #[test]
    fn unlimited_is_none() {
        assert_eq!(parse_size_bytes("Unlimited").unwrap(), None);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_size_bytes("").is_err());
        assert!(parse_size_bytes("lots").is_err());
        assert!(parse_size_bytes("10xb").is_err());
    }
}
