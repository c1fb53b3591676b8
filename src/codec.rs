//! Timestamp and color encodings shared by the subtitle writer and the
//! style resolver.

/// Format seconds as an SRT timestamp (`HH:MM:SS,mmm`).
///
/// Hours, minutes and seconds are floored; the millisecond field is the
/// fractional remainder truncated to three digits.
pub fn seconds_to_timestamp(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    let whole = seconds.trunc();
    let total = whole as u64;

    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    let millis = (((seconds - whole) * 1000.0) as u64).min(999);

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, secs, millis)
}

/// Convert a web color (`#RRGGBB`) into the packed `&HBBGGRR&` form the
/// subtitle renderer expects.
///
/// # Panics
///
/// Panics if `hex` is not six hex digits after an optional `#`. Style
/// documents are validated on load, so pipeline input never reaches this.
pub fn hex_to_packed_color(hex: &str) -> String {
    let hex = hex.trim_start_matches('#');
    let (r, g, b) = (&hex[0..2], &hex[2..4], &hex[4..6]);
    format!(
        "&H{}{}{}&",
        b.to_ascii_uppercase(),
        g.to_ascii_uppercase(),
        r.to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn test_seconds_to_timestamp() {
        assert_eq!(seconds_to_timestamp(0.0), "00:00:00,000");
        assert_eq!(seconds_to_timestamp(3661.5), "01:01:01,500");
        assert_eq!(seconds_to_timestamp(65.125), "00:01:05,125");
        assert_eq!(seconds_to_timestamp(7322.25), "02:02:02,250");
    }

    #[test]
    fn test_timestamp_shape_holds_for_large_and_fractional_values() {
        let shape = Regex::new(r"^\d{2}:\d{2}:\d{2},\d{3}$").unwrap();
        for t in [0.0, 0.001, 1.0, 59.5, 600.25, 7199.75, 86399.0, 12345.678] {
            let stamp = seconds_to_timestamp(t);
            assert!(shape.is_match(&stamp), "{} -> {}", t, stamp);
        }
    }

    #[test]
    fn test_hex_to_packed_color() {
        assert_eq!(hex_to_packed_color("#FFFFFF"), "&HFFFFFF&");
        assert_eq!(hex_to_packed_color("#E361F7"), "&HF761E3&");
        assert_eq!(hex_to_packed_color("#000000"), "&H000000&");
        assert_eq!(hex_to_packed_color("#a1b2c3"), "&HC3B2A1&");
    }

    #[test]
    fn test_packed_color_reverses_channel_order() {
        let packed = hex_to_packed_color("#123456");
        // blue, green, red
        assert_eq!(&packed[2..4], "56");
        assert_eq!(&packed[4..6], "34");
        assert_eq!(&packed[6..8], "12");
    }
}
