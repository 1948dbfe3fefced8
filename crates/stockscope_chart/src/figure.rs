use plotters::prelude::*;
use stockscope_analysis::data_point::WeeklyPoint;

use crate::{CHART_HEIGHT, CHART_WIDTH, ChartError, RenderedChart};

/// Everything the two-panel figure needs. The moving average slices are
/// index-aligned with `points`; null positions simply draw nothing.
pub struct FigureSpec<'a> {
    pub points: &'a [WeeklyPoint],
    pub short_ma: &'a [Option<f64>],
    pub long_ma: &'a [Option<f64>],
    pub symbol: &'a str,
    pub start_year: i32,
}

// Upper panel (candles + averages) gets the larger share of the 800px.
const PRICE_PANEL_HEIGHT: i32 = 520;

fn to_draw_err<E: std::fmt::Display>(err: E) -> ChartError {
    ChartError::Draw(err.to_string())
}

fn date_label(points: &[WeeklyPoint], x: f64) -> String {
    let idx = x.round();
    if idx < 0.0 {
        return String::new();
    }
    points
        .get(idx as usize)
        .map(|p| p.date.to_string())
        .unwrap_or_default()
}

fn volume_label(v: f64) -> String {
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}

/// Price axis bounds over lows, highs and both averages, padded slightly so
/// candles never touch the frame. Falls back to a unit range when every
/// value in the table is a missing marker.
fn price_bounds(spec: &FigureSpec<'_>) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;

    for p in spec.points {
        if let Some(l) = p.low {
            lo = lo.min(l);
        }
        if let Some(h) = p.high {
            hi = hi.max(h);
        }
    }
    for series in [spec.short_ma, spec.long_ma] {
        for v in series.iter().flatten() {
            lo = lo.min(*v);
            hi = hi.max(*v);
        }
    }

    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(f64::EPSILON);
    (lo - pad, hi + pad)
}

fn volume_bound(points: &[WeeklyPoint]) -> f64 {
    points
        .iter()
        .filter_map(|p| p.volume)
        .fold(0.0f64, f64::max)
        .max(1.0)
        * 1.05
}

pub fn render(spec: &FigureSpec<'_>) -> Result<RenderedChart, ChartError> {
    if spec.points.is_empty() {
        return Err(ChartError::EmptySeries);
    }

    let n = spec.points.len();
    let x_range = -0.5f64..(n as f64 - 0.5);
    let (price_lo, price_hi) = price_bounds(spec);
    let candle_width = ((CHART_WIDTH as usize / n.max(1)) as u32).saturating_sub(3).clamp(1, 12);

    let mut rgb = vec![0xffu8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    {
        let root =
            BitMapBackend::with_buffer(&mut rgb, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(to_draw_err)?;

        let (upper, lower) = root.split_vertically(PRICE_PANEL_HEIGHT);

        let mut price = ChartBuilder::on(&upper)
            .caption(
                format!(
                    "Weekly Close Prices and Moving Averages for {} ({} to Present)",
                    spec.symbol, spec.start_year
                ),
                ("sans-serif", 18),
            )
            .margin(10)
            .x_label_area_size(28)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range.clone(), price_lo..price_hi)
            .map_err(to_draw_err)?;

        price
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| date_label(spec.points, *x))
            .draw()
            .map_err(to_draw_err)?;

        price
            .draw_series(spec.points.iter().enumerate().filter_map(|(i, p)| {
                match (p.open, p.high, p.low, p.close) {
                    (Some(open), Some(high), Some(low), Some(close)) => Some(CandleStick::new(
                        i as f64,
                        open,
                        high,
                        low,
                        close,
                        GREEN.filled(),
                        RED.filled(),
                        candle_width,
                    )),
                    _ => None,
                }
            }))
            .map_err(to_draw_err)?
            .label("Price")
            .legend(|(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], GREEN.filled()));

        let short: Vec<(f64, f64)> = spec
            .short_ma
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect();
        price
            .draw_series(LineSeries::new(short, &BLUE))
            .map_err(to_draw_err)?
            .label("4-Weeks Moving Average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &BLUE));

        let long: Vec<(f64, f64)> = spec
            .long_ma
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i as f64, v)))
            .collect();
        price
            .draw_series(LineSeries::new(long, &RED))
            .map_err(to_draw_err)?
            .label("12-Weeks Moving Average")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], &RED));

        price
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(to_draw_err)?;

        let mut volume = ChartBuilder::on(&lower)
            .caption(
                format!(
                    "Weekly Trading Volume for {} ({} to Present)",
                    spec.symbol, spec.start_year
                ),
                ("sans-serif", 18),
            )
            .margin(10)
            .x_label_area_size(28)
            .y_label_area_size(60)
            .build_cartesian_2d(x_range, 0.0..volume_bound(spec.points))
            .map_err(to_draw_err)?;

        volume
            .configure_mesh()
            .x_labels(8)
            .x_label_formatter(&|x| date_label(spec.points, *x))
            .y_label_formatter(&|v| volume_label(*v))
            .draw()
            .map_err(to_draw_err)?;

        volume
            .draw_series(spec.points.iter().enumerate().filter_map(|(i, p)| {
                p.volume.map(|v| {
                    Rectangle::new(
                        [(i as f64 - 0.35, 0.0), (i as f64 + 0.35, v)],
                        RGBColor(70, 130, 180).filled(),
                    )
                })
            }))
            .map_err(to_draw_err)?;

        root.present().map_err(to_draw_err)?;
    }

    Ok(RenderedChart::new(CHART_WIDTH, CHART_HEIGHT, rgb))
}
