//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::constants::{confidence, frame_skip};

/// Parse and validate confidence value (0.0-1.0).
pub fn parse_confidence(s: &str) -> Result<f32, String> {
    let value: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !(confidence::MIN..=confidence::MAX).contains(&value) {
        return Err(format!(
            "confidence must be between {:.1} and {:.1}, got {value}",
            confidence::MIN,
            confidence::MAX
        ));
    }

    Ok(value)
}

/// Parse and validate the frame-skip interval (1-10).
pub fn parse_frame_skip(s: &str) -> Result<u32, String> {
    let value: u32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid whole number"))?;

    if !(frame_skip::MIN..=frame_skip::MAX).contains(&value) {
        return Err(format!(
            "frame skip must be between {} and {}, got {value}",
            frame_skip::MIN,
            frame_skip::MAX
        ));
    }

    Ok(value)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_confidence_valid() {
        assert_eq!(parse_confidence("0.5").ok(), Some(0.5));
        assert_eq!(parse_confidence("0.0").ok(), Some(0.0));
        assert_eq!(parse_confidence("1.0").ok(), Some(1.0));
    }

    #[test]
    fn test_parse_confidence_invalid() {
        assert!(parse_confidence("1.1").is_err());
        assert!(parse_confidence("-0.1").is_err());
        assert!(parse_confidence("abc").is_err());
        assert!(parse_confidence("NaN").is_err());
    }

    #[test]
    fn test_parse_frame_skip_bounds() {
        assert_eq!(parse_frame_skip("1").ok(), Some(1));
        assert_eq!(parse_frame_skip("10").ok(), Some(10));
        let err = parse_frame_skip("0").unwrap_err();
        assert!(err.contains("between 1 and 10"));
        assert!(parse_frame_skip("11").is_err());
        assert!(parse_frame_skip("2.5").is_err());
    }
}
