//! Plain data records handed to external serializers.

use serde::{Deserialize, Serialize};

use super::Quantizer;
use crate::error::{QuantizationError, Result};

/// Flat parameter record of a derived quantizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantizerParams {
    pub bit_width: u32,
    pub is_signed: bool,
    pub is_symmetric: bool,
    pub is_qat: bool,
    pub scale: f64,
    pub zero_point: i64,
    pub code_min: i64,
    pub code_max: i64,
}

impl QuantizerParams {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Index-aligned samples, their codes and the dequantized codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestFixture {
    pub values: Vec<f64>,
    pub qvalues: Vec<i64>,
    pub dequantized_values: Vec<f64>,
}

impl TestFixture {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Checks the fixture against `quantizer`: codes must match exactly,
    /// dequantized values within `tolerance`.
    pub fn verify(&self, quantizer: &impl Quantizer, tolerance: f64) -> Result<()> {
        if self.values.len() != self.qvalues.len()
            || self.values.len() != self.dequantized_values.len()
        {
            return Err(QuantizationError::LengthMismatch {
                values: self.values.len(),
                qvalues: self.qvalues.len(),
                dequantized: self.dequantized_values.len(),
            });
        }

        for (index, (&x, &q)) in self.values.iter().zip(&self.qvalues).enumerate() {
            let expected = quantizer.quantize(x);
            if expected != q {
                return Err(QuantizationError::FixtureMismatch {
                    index,
                    expected: expected as f64,
                    actual: q as f64,
                });
            }
        }

        for (index, (&q, &actual)) in self.qvalues.iter().zip(&self.dequantized_values).enumerate() {
            let expected = quantizer.dequantize(q);
            if (expected - actual).abs() > tolerance {
                return Err(QuantizationError::FixtureMismatch {
                    index,
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantization::{CalibrationStats, QuantizationOptions, UniformQuantizer};

    fn quantizer() -> UniformQuantizer {
        UniformQuantizer::derive(
            QuantizationOptions::new(8, true, true, true).unwrap(),
            &CalibrationStats::from_samples(&[-2.0, 2.0]),
        )
        .unwrap()
    }

    #[test]
    fn params_json_uses_flat_keys() {
        let json = quantizer().params().to_json_string().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let object = value.as_object().unwrap();
        let mut keys: Vec<_> = object.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            [
                "bit_width",
                "code_max",
                "code_min",
                "is_qat",
                "is_signed",
                "is_symmetric",
                "scale",
                "zero_point"
            ]
        );
        assert_eq!(value["bit_width"], 8);
        assert_eq!(value["is_qat"], true);
        assert_eq!(value["code_min"], -128);
        assert_eq!(value["zero_point"], 0);
    }

    #[test]
    fn params_json_round_trip() {
        let params = quantizer().params();
        let restored = QuantizerParams::from_json_str(&params.to_json_string().unwrap()).unwrap();
        assert_eq!(restored, params);
    }

    #[test]
    fn malformed_json_is_reported() {
        assert!(matches!(
            QuantizerParams::from_json_str(r#"{"bit_width": 8}"#),
            Err(QuantizationError::Json(_))
        ));
    }

    #[test]
    fn verify_accepts_matching_fixture() {
        let q = quantizer();
        let values = vec![-2.0, -0.3, 0.0, 1.1, 5.0];
        let qvalues = q.quantize_slice(&values);
        let fixture = TestFixture {
            dequantized_values: q.dequantize_slice(&qvalues),
            values,
            qvalues,
        };

        fixture.verify(&q, 0.0).unwrap();
    }

    #[test]
    fn verify_reports_first_mismatch() {
        let q = quantizer();
        let fixture = TestFixture {
            values: vec![0.0, 1.0],
            qvalues: vec![0, 3],
            dequantized_values: vec![0.0, 1.0],
        };

        match fixture.verify(&q, 1e-3) {
            Err(QuantizationError::FixtureMismatch { index, actual, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(actual, 3.0);
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn verify_rejects_unaligned_arrays() {
        let fixture = TestFixture {
            values: vec![0.0, 1.0],
            qvalues: vec![0],
            dequantized_values: vec![0.0, 1.0],
        };

        assert!(matches!(
            fixture.verify(&quantizer(), 1e-3),
            Err(QuantizationError::LengthMismatch { values: 2, qvalues: 1, dequantized: 2 })
        ));
    }
}
