use super::{pair_points, Axis, ChartSlot, ChartSpec, Dataset, SeriesKind, TickFormat, TooltipFormat};
use crate::pricing::types::PlotData;
use smallvec::smallvec;

const PAYOFF_COLOR: (u8, u8, u8) = (16, 185, 129);

/// Payoff at maturity against spot.
///
/// Returns None when the response carries no payoff_y; the renderer then
/// leaves the payoff slot empty rather than keeping the previous chart.
pub fn build(data: &PlotData) -> Option<ChartSpec> {
    let payoff_y = data.payoff_y.as_ref()?;

    Some(ChartSpec {
        slot: ChartSlot::Payoff,
        title: Some("Payoff at Maturity vs Spot"),
        x_axis: Axis {
            title: "Spot Price",
            ticks: TickFormat::Plain,
        },
        y_axis: Axis {
            title: "Payoff",
            ticks: TickFormat::Plain,
        },
        datasets: smallvec![Dataset {
            label: "Payoff at Maturity",
            kind: SeriesKind::FilledLine,
            color: PAYOFF_COLOR,
            points: pair_points(&data.payoff_x, payoff_y),
            tooltip: TooltipFormat::SpotPayoff,
        }],
        zero_line: true,
    })
}
