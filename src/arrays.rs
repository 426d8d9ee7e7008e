use rayon::prelude::*;

use crate::quantization::{Quantizer, Sample, TestFixture, UniformQuantizer};

/// Float samples together with their codes under one quantizer.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizedArray<'q, Q: Quantizer = UniformQuantizer> {
    float_values: Vec<f64>,
    quantized_values: Vec<i64>,
    quantizer: &'q Q,
}

impl<'q, Q: Quantizer> QuantizedArray<'q, Q> {
    pub fn new<T: Sample>(samples: &[T], quantizer: &'q Q) -> Self {
        let float_values: Vec<f64> = samples.iter().map(|s| s.to_f64()).collect();
        let quantized_values = quantizer.quantize_slice(&float_values);

        Self {
            float_values,
            quantized_values,
            quantizer,
        }
    }

    /// Same as [`QuantizedArray::new`], quantizing elements on the rayon pool.
    pub fn par_new<T: Sample>(samples: &[T], quantizer: &'q Q) -> Self
    where
        Q: Sync,
    {
        let float_values: Vec<f64> = samples.par_iter().map(|s| s.to_f64()).collect();
        let quantized_values = float_values
            .par_iter()
            .map(|&x| quantizer.quantize(x))
            .collect();

        Self {
            float_values,
            quantized_values,
            quantizer,
        }
    }

    pub fn float_values(&self) -> &[f64] {
        &self.float_values
    }

    pub fn quantized_values(&self) -> &[i64] {
        &self.quantized_values
    }

    pub fn quantizer(&self) -> &'q Q {
        self.quantizer
    }

    pub fn len(&self) -> usize {
        self.float_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.float_values.is_empty()
    }

    /// Recomputed from the codes on every call.
    pub fn dequantized_values(&self) -> Vec<f64> {
        self.quantizer.dequantize_slice(&self.quantized_values)
    }

    pub fn mean_squared_error(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }

        let n = self.len() as f64;
        self.float_values
            .iter()
            .zip(self.dequantized_values())
            .map(|(&x, y)| (x - y).powi(2))
            .sum::<f64>()
            / n
    }

    pub fn max_abs_error(&self) -> f64 {
        self.float_values
            .iter()
            .zip(self.dequantized_values())
            .map(|(&x, y)| (x - y).abs())
            .fold(0.0, f64::max)
    }

    pub fn to_fixture(&self) -> TestFixture {
        TestFixture {
            values: self.float_values.clone(),
            qvalues: self.quantized_values.clone(),
            dequantized_values: self.dequantized_values(),
        }
    }
}
