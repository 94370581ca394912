use super::{pair_points, Axis, ChartSlot, ChartSpec, Dataset, SeriesKind, TickFormat, TooltipFormat};
use crate::pricing::types::PlotData;
use smallvec::smallvec;

const CURVE_COLOR: (u8, u8, u8) = (59, 130, 246);
const QUOTE_COLOR: (u8, u8, u8) = (139, 92, 246);

/// Interpolated smile as a line, surface quotes as labelled markers.
pub fn build(data: &PlotData) -> ChartSpec {
    ChartSpec {
        slot: ChartSlot::Vol,
        title: None,
        x_axis: Axis {
            title: "Strike",
            ticks: TickFormat::Plain,
        },
        y_axis: Axis {
            title: "Volatility",
            ticks: TickFormat::Percent,
        },
        datasets: smallvec![
            Dataset {
                label: "Vol Surface",
                kind: SeriesKind::Line,
                color: CURVE_COLOR,
                points: pair_points(&data.curve_x, &data.curve_y),
                tooltip: TooltipFormat::StrikeVol,
            },
            Dataset {
                label: "Quotes",
                kind: SeriesKind::Markers,
                color: QUOTE_COLOR,
                points: pair_points(&data.points_x, &data.points_y),
                tooltip: TooltipFormat::LabeledStrikeVol(data.point_labels.clone()),
            },
        ],
        zero_line: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::tests::sample_plot;
    use crate::chart::Point;

    #[test]
    fn test_curve_and_quote_series() {
        let spec = build(&sample_plot());
        assert_eq!(spec.datasets.len(), 2);

        let curve = &spec.datasets[0];
        assert_eq!(curve.kind, SeriesKind::Line);
        assert_eq!(curve.points[2], Point { x: 3.0, y: 0.3 });

        let quotes = &spec.datasets[1];
        assert_eq!(quotes.kind, SeriesKind::Markers);
        assert_eq!(quotes.points.len(), 2);
        assert_eq!(spec.y_axis.ticks, TickFormat::Percent);
    }

    #[test]
    fn test_quote_tooltip_uses_label() {
        let spec = build(&sample_plot());
        assert_eq!(spec.tooltip(1, 0).unwrap(), "25 Delta: K=1.5000, Vol=12.00%");
        assert_eq!(spec.tooltip(0, 1).unwrap(), "K=2.0000, Vol=20.00%");
    }
}
