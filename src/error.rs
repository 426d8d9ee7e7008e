use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuantizationError {
    #[error("bit width {bit_width} is outside the supported range [2, 16]")]
    InvalidBitWidth { bit_width: u32 },

    #[error("cannot derive quantization parameters before any sample was observed")]
    EmptyCalibration,

    #[error("invalid quantizer parameters: {0}")]
    InvalidParams(String),

    #[error("fixture arrays are not index-aligned: {values} values, {qvalues} qvalues, {dequantized} dequantized values")]
    LengthMismatch {
        values: usize,
        qvalues: usize,
        dequantized: usize,
    },

    #[error("fixture mismatch at index {index}: expected {expected}, got {actual}")]
    FixtureMismatch {
        index: usize,
        expected: f64,
        actual: f64,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuantizationError>;
