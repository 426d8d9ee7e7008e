use ndarray::{Array, ArrayBase, Data, Dimension};
use tracing::{debug, warn};

use super::{CalibrationStats, QuantizationOptions, Quantizer, QuantizerParams};
use crate::error::{QuantizationError, Result};

/// Smallest magnitude (symmetric) or span (asymmetric) used to derive a scale.
/// Constant calibration data is widened to this instead of producing a zero scale.
pub const EPSILON: f64 = 1e-12;

/// Affine quantizer with parameters derived once from calibration stats.
///
/// `code = round(x / scale) + zero_point`, saturated to `[code_min, code_max]`;
/// `x ≈ (code - zero_point) * scale`. Ties round to even.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformQuantizer {
    options: QuantizationOptions,
    stats: CalibrationStats,
    scale: f64,
    zero_point: i64,
    code_min: i64,
    code_max: i64,
}

impl UniformQuantizer {
    pub fn derive(options: QuantizationOptions, stats: &CalibrationStats) -> Result<Self> {
        let (min_value, max_value) = stats.bounds()?;
        let (code_min, code_max) = options.code_range();

        let (scale, zero_point) = if options.is_symmetric() {
            let mut abs_max = min_value.abs().max(max_value.abs());
            if abs_max < EPSILON {
                warn!(abs_max, "degenerate calibration range, using minimum magnitude");
                abs_max = EPSILON;
            }

            // signed codes give up code_min so zero sits in the middle
            let sym_bound = if options.is_signed() {
                code_min.abs().min(code_max)
            } else {
                code_max
            };

            (abs_max / sym_bound as f64, 0)
        } else {
            // divide before subtracting so bounds near ±f64::MAX stay finite
            let range = (code_max - code_min) as f64;
            let mut scale = max_value / range - min_value / range;
            if scale < EPSILON / range {
                warn!(span = max_value - min_value, "degenerate calibration range, using minimum span");
                scale = EPSILON / range;
            }

            let zero_point = (code_min as f64 - min_value / scale)
                .round_ties_even()
                .clamp(code_min as f64, code_max as f64) as i64;

            (scale, zero_point)
        };

        debug!(
            bit_width = options.bit_width(),
            is_signed = options.is_signed(),
            is_symmetric = options.is_symmetric(),
            min_value,
            max_value,
            scale,
            zero_point,
            code_min,
            code_max,
            "derived quantization parameters"
        );

        Ok(Self {
            options,
            stats: *stats,
            scale,
            zero_point,
            code_min,
            code_max,
        })
    }

    /// Rebuilds a quantizer from a persisted parameter record.
    ///
    /// The record carries no calibration bounds, so the reconstructed stats are
    /// the float range covered by the code range.
    pub fn from_params(params: QuantizerParams) -> Result<Self> {
        let options = QuantizationOptions::new(
            params.bit_width,
            params.is_signed,
            params.is_symmetric,
            params.is_qat,
        )?;

        let (code_min, code_max) = options.code_range();
        if (params.code_min, params.code_max) != (code_min, code_max) {
            return Err(QuantizationError::InvalidParams(format!(
                "code range [{}, {}] does not match {}-bit {} codes [{}, {}]",
                params.code_min,
                params.code_max,
                params.bit_width,
                if params.is_signed { "signed" } else { "unsigned" },
                code_min,
                code_max
            )));
        }
        if !params.scale.is_finite() || params.scale <= 0.0 {
            return Err(QuantizationError::InvalidParams(format!(
                "scale must be finite and positive, got {}",
                params.scale
            )));
        }
        if !(code_min..=code_max).contains(&params.zero_point) {
            return Err(QuantizationError::InvalidParams(format!(
                "zero point {} outside [{}, {}]",
                params.zero_point, code_min, code_max
            )));
        }
        if params.is_symmetric && params.zero_point != 0 {
            return Err(QuantizationError::InvalidParams(format!(
                "symmetric quantizer must have zero point 0, got {}",
                params.zero_point
            )));
        }

        let mut quantizer = Self {
            options,
            stats: CalibrationStats::new(),
            scale: params.scale,
            zero_point: params.zero_point,
            code_min,
            code_max,
        };
        quantizer.stats = CalibrationStats::from_bounds(
            quantizer.dequantize(code_min),
            quantizer.dequantize(code_max),
        );

        Ok(quantizer)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_params(QuantizerParams::from_json_str(json)?)
    }

    pub fn params(&self) -> QuantizerParams {
        QuantizerParams {
            bit_width: self.options.bit_width(),
            is_signed: self.options.is_signed(),
            is_symmetric: self.options.is_symmetric(),
            is_qat: self.options.is_qat(),
            scale: self.scale,
            zero_point: self.zero_point,
            code_min: self.code_min,
            code_max: self.code_max,
        }
    }

    /// Quantizes every element, keeping the shape.
    pub fn quantize_array<S, D>(&self, values: &ArrayBase<S, D>) -> Array<i64, D>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        values.mapv(|x| self.quantize(x))
    }

    pub fn dequantize_array<S, D>(&self, q_values: &ArrayBase<S, D>) -> Array<f64, D>
    where
        S: Data<Elem = i64>,
        D: Dimension,
    {
        q_values.mapv(|q| self.dequantize(q))
    }

    pub fn options(&self) -> &QuantizationOptions {
        &self.options
    }

    pub fn stats(&self) -> &CalibrationStats {
        &self.stats
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn zero_point(&self) -> i64 {
        self.zero_point
    }

    pub fn code_min(&self) -> i64 {
        self.code_min
    }

    pub fn code_max(&self) -> i64 {
        self.code_max
    }
}

impl Quantizer for UniformQuantizer {
    /// Saturates out-of-range inputs; NaN maps to code 0.
    fn quantize(&self, real_val: f64) -> i64 {
        if real_val.is_nan() {
            return 0_i64.clamp(self.code_min, self.code_max);
        }

        ((real_val / self.scale).round_ties_even() + self.zero_point as f64)
            .clamp(self.code_min as f64, self.code_max as f64) as i64
    }

    /// Saturates to the finite f64 range when the product overflows.
    fn dequantize(&self, q_val: i64) -> f64 {
        (self.scale * (q_val as f64 - self.zero_point as f64)).clamp(-f64::MAX, f64::MAX)
    }
}
