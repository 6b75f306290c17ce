use crate::{
    bounds::Bounds,
    encode::{EncodedImage, Run},
    error::{CodecError, Result},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub palette_index: u8, // Reserved header byte, always 0 from our encoder
    pub bounds: Bounds,
    pub runs: Vec<Run>,
}

impl AsRef<str> for EncodedImage {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

fn malformed(msg: impl Into<String>) -> CodecError {
    CodecError::MalformedEncoding(msg.into())
}

fn hex_bytes(hex: &str) -> Result<Vec<u8>> {
    if let Some((pos, c)) = hex.char_indices().find(|(_, c)| !c.is_ascii_hexdigit()) {
        return Err(malformed(format!("invalid hex digit {:?} at {}", c, pos)));
    }
    if hex.len() % 2 != 0 {
        return Err(malformed(format!("odd number of hex digits ({})", hex.len())));
    }
    Ok(hex
        .as_bytes()
        .chunks_exact(2)
        .map(|pair| {
            let hi = (pair[0] as char).to_digit(16).unwrap_or(0);
            let lo = (pair[1] as char).to_digit(16).unwrap_or(0);
            (hi << 4 | lo) as u8
        })
        .collect())
}

/// Parse a layer encoding (with or without the "0x" prefix).
///
/// Besides the syntax, this checks that every run is non-empty and that the runs
/// exactly cover the bounding box.
pub fn decode_image(data: impl AsRef<str>) -> Result<DecodedImage> {
    let data = data.as_ref();
    let hex = data.strip_prefix("0x").unwrap_or(data);
    let bytes = hex_bytes(hex)?;
    if bytes.len() < 5 {
        return Err(malformed(format!(
            "header needs 5 bytes, found {}",
            bytes.len()
        )));
    }

    let bounds = Bounds {
        top: bytes[1],
        right: bytes[2],
        bottom: bytes[3],
        left: bytes[4],
    };
    let run_bytes = &bytes[5..];
    if run_bytes.len() % 2 != 0 {
        return Err(malformed("run section ends with an incomplete pair"));
    }

    let runs: Vec<Run> = run_bytes
        .chunks_exact(2)
        .map(|pair| Run {
            length: pair[0],
            color_idx: pair[1],
        })
        .collect();
    if let Some(i) = runs.iter().position(|r| r.length == 0) {
        return Err(malformed(format!("run {} has zero length", i)));
    }
    let total: u32 = runs.iter().map(|r| r.length as u32).sum();
    if total != bounds.area() {
        return Err(malformed(format!(
            "runs cover {} pixels but the bounds hold {}",
            total,
            bounds.area()
        )));
    }

    Ok(DecodedImage {
        palette_index: bytes[0],
        bounds,
        runs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn decodes_two_by_two_square() {
        let d = decode_image("0x00000201000401").unwrap();
        assert_eq!(d.palette_index, 0);
        assert_eq!(
            d.bounds,
            Bounds {
                top: 0,
                right: 2,
                bottom: 1,
                left: 0
            }
        );
        assert_eq!(
            d.runs,
            vec![Run {
                length: 4,
                color_idx: 1
            }]
        );
    }

    #[test]
    fn prefix_is_optional() {
        assert_eq!(
            decode_image("00000201000401").unwrap(),
            decode_image("0x00000201000401").unwrap()
        );
    }

    #[test]
    fn uppercase_digits_are_accepted() {
        let d = decode_image("0x0000FF0000FF01").unwrap();
        assert_eq!(d.bounds.right, 255);
        assert_eq!(d.runs[0].length, 255);
    }

    #[test]
    fn empty_layer() {
        let d = decode_image(EncodedImage::from("0x0000000000")).unwrap();
        assert!(d.bounds.is_empty());
        assert!(d.runs.is_empty());
    }

    #[test]
    fn trailing_half_pair_is_rejected() {
        assert!(matches!(
            decode_image("0x0000020100040101"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn odd_digit_count_is_rejected() {
        assert!(matches!(
            decode_image("0x000002010004010"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn bad_digits_are_rejected() {
        assert!(matches!(
            decode_image("0x0000020100040g"),
            Err(CodecError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_image("0x00+0020100040"),
            Err(CodecError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_image("0x0000é0100"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(matches!(
            decode_image("0x00000201"),
            Err(CodecError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_image(""),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn coverage_mismatch_is_rejected() {
        // 2x2 box but only 3 pixels of runs
        assert!(matches!(
            decode_image("0x00000201000301"),
            Err(CodecError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_image("0x00000201000501"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn zero_length_run_is_rejected() {
        assert!(matches!(
            decode_image("0x000002010000010401"),
            Err(CodecError::MalformedEncoding(_))
        ));
    }
}
