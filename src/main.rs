// Plot round-trip MSE of uniform quantization against bit width
use affine_quantizer::quantization::options::{MAX_BIT_WIDTH, MIN_BIT_WIDTH};
use affine_quantizer::{CalibrationStats, QuantizationOptions, QuantizedArray, UniformQuantizer};

use plotters::prelude::*;
use rand::Rng;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let linspace: Vec<f64> = (0..100).map(|i| -1.0 + 2.0 * i as f64 / 99.0).collect();
    let mut rng = rand::rng();
    let random: Vec<f64> = (0..10_000).map(|_| rng.random_range(-0.5..2.0)).collect();

    let series = [
        ("Symmetric, linspace", mse_by_bit_width(&linspace, true)?, RED),
        ("Asymmetric, linspace", mse_by_bit_width(&linspace, false)?, BLUE),
        ("Symmetric, random", mse_by_bit_width(&random, true)?, MAGENTA),
        ("Asymmetric, random", mse_by_bit_width(&random, false)?, GREEN),
    ];

    let quantizer = UniformQuantizer::derive(
        QuantizationOptions::default(),
        &CalibrationStats::from_samples(&linspace),
    )?;
    info!(params = %quantizer.params().to_json_string()?, "8-bit signed symmetric parameters");

    let root = BitMapBackend::new("mse-bit-width.png", (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    // log10 so the 2-bit and 16-bit errors fit one chart
    let log_points = |points: &[(f32, f32)]| -> Vec<(f32, f32)> {
        points
            .iter()
            .map(|&(x, y)| (x, y.max(f32::MIN_POSITIVE).log10()))
            .collect()
    };
    let (y_min, y_max) = series
        .iter()
        .flat_map(|(_, points, _)| log_points(points.as_slice()))
        .fold((f32::MAX, f32::MIN), |(lo, hi), (_, y)| (lo.min(y), hi.max(y)));

    let mut chart = ChartBuilder::on(&root)
        .caption("MSE vs. Bit Width", ("sans-serif", 40).into_font())
        .margin(30)
        .x_label_area_size(50)
        .y_label_area_size(75)
        .build_cartesian_2d(
            MIN_BIT_WIDTH as f32..MAX_BIT_WIDTH as f32,
            (y_min - 0.5)..(y_max + 0.5),
        )?;

    chart
        .configure_mesh()
        .x_desc("Bit Width")
        .y_desc("log10 Mean Squared Error (MSE)")
        .light_line_style(&WHITE.mix(0.8))
        .draw()?;

    for (label, points, color) in &series {
        let points = log_points(points.as_slice());
        let color = *color;
        chart
            .draw_series(LineSeries::new(points.iter().cloned(), &color))?
            .label(*label)
            .legend(move |(x, y)| PathElement::new(vec![(x - 5, y), (x + 5, y)], color));

        chart.draw_series(points.iter().map(|(x, y)| Circle::new((*x, *y), 3, color.filled())))?;
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    info!(path = "mse-bit-width.png", "wrote plot");

    Ok(())
}

fn mse_by_bit_width(
    samples: &[f64],
    is_symmetric: bool,
) -> Result<Vec<(f32, f32)>, affine_quantizer::QuantizationError> {
    let stats = CalibrationStats::from_shards(samples, 1024);

    let mut mses = Vec::new();
    for bit_width in MIN_BIT_WIDTH..=MAX_BIT_WIDTH {
        let options = QuantizationOptions::new(bit_width, true, is_symmetric, false)?;
        let quantizer = UniformQuantizer::derive(options, &stats)?;
        let array = QuantizedArray::new(samples, &quantizer);

        info!(
            bit_width,
            is_symmetric,
            scale = quantizer.scale(),
            zero_point = quantizer.zero_point(),
            mse = array.mean_squared_error(),
            "quantized samples"
        );
        mses.push((bit_width as f32, array.mean_squared_error() as f32));
    }

    Ok(mses)
}
