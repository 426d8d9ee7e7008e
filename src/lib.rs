//! Uniform (affine) quantization: min/max calibration, parameter derivation
//! and the quantize/dequantize transforms that map floats onto a fixed-width
//! integer code range.

pub mod arrays;
pub mod error;
pub mod quantization;

pub use arrays::QuantizedArray;
pub use error::{QuantizationError, Result};
pub use quantization::{
    CalibrationStats, QuantizationOptions, Quantizer, QuantizerParams, Sample, TestFixture,
    UniformQuantizer,
};
