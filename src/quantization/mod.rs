pub mod options;
pub mod params;
pub mod stats;
pub mod uniform;

pub use options::QuantizationOptions;
pub use params::{QuantizerParams, TestFixture};
pub use stats::CalibrationStats;
pub use uniform::UniformQuantizer;

/// Maps floats onto integer codes and back.
pub trait Quantizer {
    fn quantize(&self, real_val: f64) -> i64;
    fn dequantize(&self, q_val: i64) -> f64;

    fn quantize_slice(&self, values: &[f64]) -> Vec<i64> {
        values.iter().map(|&x| self.quantize(x)).collect()
    }

    fn dequantize_slice(&self, q_values: &[i64]) -> Vec<f64> {
        q_values.iter().map(|&q| self.dequantize(q)).collect()
    }
}

/// Floating-point sample types accepted by calibration and [`crate::QuantizedArray`].
pub trait Sample: Copy + Send + Sync {
    fn to_f64(self) -> f64;
}

impl Sample for f64 {
    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

impl Sample for f32 {
    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}
