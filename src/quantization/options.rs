use serde::{Deserialize, Serialize};

use crate::error::{QuantizationError, Result};

pub const MIN_BIT_WIDTH: u32 = 2;
pub const MAX_BIT_WIDTH: u32 = 16;

/// Bit width, signedness and symmetry of a quantized code.
///
/// Only constructible through [`QuantizationOptions::new`] (serde goes through
/// the same check), so a value of this type always has a valid bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOptions")]
pub struct QuantizationOptions {
    bit_width: u32,
    is_signed: bool,
    is_symmetric: bool,
    is_qat: bool,
}

#[derive(Deserialize)]
struct RawOptions {
    bit_width: u32,
    is_signed: bool,
    is_symmetric: bool,
    #[serde(default)]
    is_qat: bool,
}

impl TryFrom<RawOptions> for QuantizationOptions {
    type Error = QuantizationError;

    fn try_from(raw: RawOptions) -> Result<Self> {
        Self::new(raw.bit_width, raw.is_signed, raw.is_symmetric, raw.is_qat)
    }
}

impl QuantizationOptions {
    pub fn new(bit_width: u32, is_signed: bool, is_symmetric: bool, is_qat: bool) -> Result<Self> {
        if !(MIN_BIT_WIDTH..=MAX_BIT_WIDTH).contains(&bit_width) {
            return Err(QuantizationError::InvalidBitWidth { bit_width });
        }

        Ok(Self {
            bit_width,
            is_signed,
            is_symmetric,
            is_qat,
        })
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    pub fn is_signed(&self) -> bool {
        self.is_signed
    }

    pub fn is_symmetric(&self) -> bool {
        self.is_symmetric
    }

    /// Carried into the persisted record only; derivation ignores it.
    pub fn is_qat(&self) -> bool {
        self.is_qat
    }

    /// Inclusive `(code_min, code_max)` for this bit width and signedness.
    pub fn code_range(&self) -> (i64, i64) {
        if self.is_signed {
            let half = 1_i64 << (self.bit_width - 1);
            (-half, half - 1)
        } else {
            (0, (1_i64 << self.bit_width) - 1)
        }
    }
}

impl Default for QuantizationOptions {
    fn default() -> Self {
        Self {
            bit_width: 8,
            is_signed: true,
            is_symmetric: true,
            is_qat: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bit_widths_outside_range() {
        for bit_width in [0, 1, 17, 32] {
            assert!(matches!(
                QuantizationOptions::new(bit_width, true, true, false),
                Err(QuantizationError::InvalidBitWidth { bit_width: b }) if b == bit_width
            ));
        }
        assert!(QuantizationOptions::new(2, false, false, false).is_ok());
        assert!(QuantizationOptions::new(16, true, false, true).is_ok());
    }

    #[test]
    fn code_ranges() {
        let signed = QuantizationOptions::new(8, true, false, false).unwrap();
        assert_eq!(signed.code_range(), (-128, 127));

        let unsigned = QuantizationOptions::new(8, false, false, false).unwrap();
        assert_eq!(unsigned.code_range(), (0, 255));

        let narrow = QuantizationOptions::new(2, true, true, false).unwrap();
        assert_eq!(narrow.code_range(), (-2, 1));

        let wide = QuantizationOptions::new(16, false, true, false).unwrap();
        assert_eq!(wide.code_range(), (0, 65535));
    }

    #[test]
    fn deserialize_validates_bit_width() {
        let ok: QuantizationOptions =
            serde_json::from_str(r#"{"bit_width": 4, "is_signed": false, "is_symmetric": false}"#)
                .unwrap();
        assert_eq!(ok.bit_width(), 4);
        assert!(!ok.is_qat());

        let err = serde_json::from_str::<QuantizationOptions>(
            r#"{"bit_width": 17, "is_signed": true, "is_symmetric": true, "is_qat": false}"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn default_is_signed_symmetric_8_bit() {
        let options = QuantizationOptions::default();
        assert_eq!(options.bit_width(), 8);
        assert!(options.is_signed());
        assert!(options.is_symmetric());
        assert!(!options.is_qat());
    }
}
