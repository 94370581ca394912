use super::{ChartEngine, ChartHandle, ChartSlot, ChartSpec, Point, SeriesKind};
use crate::errors::{ClientError, ClientResult};
use plotters::prelude::*;
use std::collections::HashMap;
use std::ops::Range;
use uuid::Uuid;

struct RenderedChart {
    slot: ChartSlot,
    svg: String,
}

/// Draws charts to in-memory SVG documents with plotters.
pub struct SvgChartEngine {
    width: u32,
    height: u32,
    live: HashMap<Uuid, RenderedChart>,
}

impl SvgChartEngine {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            live: HashMap::new(),
        }
    }
}

impl ChartEngine for SvgChartEngine {
    fn create(&mut self, spec: &ChartSpec) -> ClientResult<ChartHandle> {
        let svg = draw(spec, self.width, self.height)?;
        let handle = ChartHandle::new(spec.slot);
        self.live.insert(
            handle.id(),
            RenderedChart {
                slot: handle.slot(),
                svg,
            },
        );
        Ok(handle)
    }

    fn destroy(&mut self, handle: ChartHandle) {
        if self.live.remove(&handle.id()).is_none() {
            tracing::warn!(id = %handle.id(), "destroy for unknown chart handle");
        }
    }

    fn output(&self, handle: &ChartHandle) -> Option<&str> {
        self.live.get(&handle.id()).map(|c| c.svg.as_str())
    }

    fn live_count(&self, slot: ChartSlot) -> usize {
        self.live.values().filter(|c| c.slot == slot).count()
    }
}

#[inline]
fn chart_err<E: std::fmt::Display>(e: E) -> ClientError {
    ClientError::Chart(e.to_string())
}

fn rgb(color: (u8, u8, u8)) -> RGBColor {
    RGBColor(color.0, color.1, color.2)
}

/// Axis ranges covering every finite point. Degenerate ranges are widened.
/// Fails when the data spans more than an f64 can hold.
fn bounds(spec: &ChartSpec) -> ClientResult<(Range<f64>, Range<f64>)> {
    let points = spec
        .datasets
        .iter()
        .flat_map(|d| d.points.iter())
        .filter(|p| p.x.is_finite() && p.y.is_finite());

    let (mut x_lo, mut x_hi, mut y_lo, mut y_hi) =
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY);
    for Point { x, y } in points {
        x_lo = x_lo.min(*x);
        x_hi = x_hi.max(*x);
        y_lo = y_lo.min(*y);
        y_hi = y_hi.max(*y);
    }

    if spec.zero_line {
        y_lo = y_lo.min(0.0);
        y_hi = y_hi.max(0.0);
    }

    Ok((widen(x_lo, x_hi, 0.0)?, widen(y_lo, y_hi, 0.05)?))
}

fn widen(lo: f64, hi: f64, pad_frac: f64) -> ClientResult<Range<f64>> {
    if !lo.is_finite() || !hi.is_finite() {
        return Ok(0.0..1.0);
    }
    let span = hi - lo;
    let pad = if span <= f64::EPSILON {
        if lo.abs() > f64::EPSILON { lo.abs() * 0.05 } else { 1.0 }
    } else {
        span * pad_frac
    };

    let (start, end) = (lo - pad, hi + pad);
    if !span.is_finite() || !start.is_finite() || !end.is_finite() || !(end - start).is_finite() {
        return Err(ClientError::Chart(format!("axis range {lo}..{hi} overflows")));
    }
    Ok(start..end)
}

fn draw(spec: &ChartSpec, width: u32, height: u32) -> ClientResult<String> {
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_err)?;

        let (x_range, y_range) = bounds(spec)?;
        let (x_lo, x_hi) = (x_range.start, x_range.end);

        let mut builder = ChartBuilder::on(&root);
        builder.margin(20).x_label_area_size(40).y_label_area_size(60);
        if let Some(title) = spec.title {
            builder.caption(title, ("sans-serif", 20));
        }
        let mut chart = builder
            .build_cartesian_2d(x_range, y_range)
            .map_err(chart_err)?;

        let x_fmt = |v: &f64| spec.x_axis.ticks.format(*v);
        let y_fmt = |v: &f64| spec.y_axis.ticks.format(*v);
        chart
            .configure_mesh()
            .x_desc(spec.x_axis.title)
            .y_desc(spec.y_axis.title)
            .x_label_formatter(&x_fmt)
            .y_label_formatter(&y_fmt)
            .draw()
            .map_err(chart_err)?;

        if spec.zero_line {
            chart
                .draw_series(LineSeries::new(
                    vec![(x_lo, 0.0), (x_hi, 0.0)],
                    BLACK.stroke_width(1),
                ))
                .map_err(chart_err)?;
        }

        for ds in &spec.datasets {
            let color = rgb(ds.color);
            let coords = ds.points.iter().map(|p| (p.x, p.y));

            let anno = match ds.kind {
                SeriesKind::Line => chart.draw_series(LineSeries::new(coords, color.stroke_width(2))),
                SeriesKind::Markers => {
                    chart.draw_series(coords.map(|c| Circle::new(c, 6, color.filled())))
                }
                SeriesKind::FilledLine => chart.draw_series(
                    AreaSeries::new(coords, 0.0, color.mix(0.1).filled())
                        .border_style(color.stroke_width(2)),
                ),
            }
            .map_err(chart_err)?;

            anno.label(ds.label).legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;

        root.present().map_err(chart_err)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::sample_plot;
    use crate::chart::{payoff, vol, ChartRenderer};

    #[test]
    fn test_renders_svg_documents() {
        let mut engine = SvgChartEngine::new(320, 200);
        let handle = engine.create(&vol::build(&sample_plot())).unwrap();
        let svg = engine.output(&handle).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Vol Surface"));
        assert_eq!(engine.live_count(ChartSlot::Vol), 1);

        engine.destroy(handle);
        assert_eq!(engine.live_count(ChartSlot::Vol), 0);
    }

    #[test]
    fn test_payoff_svg_has_title() {
        let mut engine = SvgChartEngine::new(320, 200);
        let spec = payoff::build(&sample_plot()).unwrap();
        let handle = engine.create(&spec).unwrap();
        assert!(engine.output(&handle).unwrap().contains("Payoff at Maturity vs Spot"));
    }

    #[test]
    fn test_renderer_releases_previous_svg() {
        let mut renderer = ChartRenderer::new(SvgChartEngine::new(320, 200));
        renderer.render(&sample_plot()).unwrap();
        renderer.render(&sample_plot()).unwrap();
        assert_eq!(renderer.engine().live_count(ChartSlot::Vol), 1);
        assert_eq!(renderer.engine().live_count(ChartSlot::Payoff), 1);
        assert!(renderer.output(ChartSlot::Payoff).is_some());
    }

    #[test]
    fn test_bounds_handle_degenerate_data() {
        let mut data = sample_plot();
        data.curve_x = vec![1.0];
        data.curve_y = vec![0.1];
        data.points_x = vec![1.0];
        data.points_y = vec![0.1];
        data.point_labels = vec!["ATM".into()];
        let (x, y) = bounds(&vol::build(&data)).unwrap();
        assert!(x.start < 1.0 && x.end > 1.0);
        assert!(y.start < 0.1 && y.end > 0.1);

        let spec = payoff::build(&sample_plot()).unwrap();
        let (_, y) = bounds(&spec).unwrap();
        assert!(y.start <= 0.0);
    }

    #[test]
    fn test_extreme_values_fail_instead_of_panicking() {
        let mut data = sample_plot();
        data.payoff_x = vec![-1e308, 1e308, 0.0];
        data.payoff_y = Some(vec![1e308, -1e308, 0.0]);

        let mut engine = SvgChartEngine::new(320, 200);
        let err = engine.create(&payoff::build(&data).unwrap()).unwrap_err();
        assert!(matches!(err, ClientError::Chart(_)));
        assert_eq!(engine.live_count(ChartSlot::Payoff), 0);

        // near the top of the range the padding alone overflows
        let range = widen(1.0, 1.79e308, 0.05);
        assert!(range.is_err());
        assert!(widen(-1.0, 1.0, 0.05).is_ok());
    }
}
