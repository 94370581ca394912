pub mod payoff;
pub mod svg;
pub mod vol;

use crate::errors::ClientResult;
use crate::pricing::types::PlotData;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use uuid::Uuid;

// ── Chart model ──

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    Vol,
    Payoff,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 2] = [ChartSlot::Vol, ChartSlot::Payoff];

    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vol => "vol",
            Self::Payoff => "payoff",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vol" => Some(Self::Vol),
            "payoff" => Some(Self::Payoff),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Zip two coordinate sequences by index.
pub fn pair_points(xs: &[f64], ys: &[f64]) -> Vec<Point> {
    xs.iter().zip(ys).map(|(&x, &y)| Point { x, y }).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Continuous line, no markers.
    Line,
    /// Discrete markers only.
    Markers,
    /// Line with the area down to zero filled.
    FilledLine,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TooltipFormat {
    StrikeVol,
    /// Strike/vol prefixed by the label at the same index.
    LabeledStrikeVol(Vec<String>),
    SpotPayoff,
}

impl TooltipFormat {
    pub fn format(&self, index: usize, point: Point) -> String {
        match self {
            Self::StrikeVol => strike_vol_text(point),
            Self::LabeledStrikeVol(labels) => {
                let label = labels.get(index).map(String::as_str).unwrap_or("");
                format!("{label}: {}", strike_vol_text(point))
            }
            Self::SpotPayoff => format!("Spot={:.4}, Payoff={:.4}", point.x, point.y),
        }
    }
}

#[inline]
fn strike_vol_text(point: Point) -> String {
    format!("K={:.4}, Vol={:.2}%", point.x, point.y * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFormat {
    Plain,
    Percent,
}

impl TickFormat {
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Plain => format!("{value:.3}"),
            Self::Percent => format!("{:.1}%", value * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: &'static str,
    pub ticks: TickFormat,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: &'static str,
    pub kind: SeriesKind,
    pub color: (u8, u8, u8),
    pub points: Vec<Point>,
    pub tooltip: TooltipFormat,
}

/// Everything a rendering engine needs to draw one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub slot: ChartSlot,
    pub title: Option<&'static str>,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub datasets: SmallVec<[Dataset; 2]>,
    pub zero_line: bool,
}

impl ChartSpec {
    /// Hover text for a point, or None if the point does not exist.
    pub fn tooltip(&self, dataset: usize, index: usize) -> Option<String> {
        let ds = self.datasets.get(dataset)?;
        let point = *ds.points.get(index)?;
        Some(ds.tooltip.format(index, point))
    }
}

// ── Rendering engine seam ──

/// Live chart in a rendering engine. Not clonable: whoever holds it
/// is responsible for handing it back to `ChartEngine::destroy`.
#[derive(Debug, PartialEq, Eq)]
pub struct ChartHandle {
    id: Uuid,
    slot: ChartSlot,
}

impl ChartHandle {
    pub(crate) fn new(slot: ChartSlot) -> Self {
        Self { id: Uuid::new_v4(), slot }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn slot(&self) -> ChartSlot {
        self.slot
    }
}

/// Rendering engine behind the chart slots.
/// Send required: the session owning it runs as a tokio task.
pub trait ChartEngine: Send {
    fn create(&mut self, spec: &ChartSpec) -> ClientResult<ChartHandle>;

    fn destroy(&mut self, handle: ChartHandle);

    /// Rendered output for a live chart.
    fn output(&self, handle: &ChartHandle) -> Option<&str>;

    fn live_count(&self, slot: ChartSlot) -> usize;
}

struct LiveChart {
    handle: ChartHandle,
    spec: ChartSpec,
}

/// Owns at most one live chart per slot. Every render destroys the
/// previous chart in that slot before creating the next one.
pub struct ChartRenderer<E: ChartEngine> {
    engine: E,
    vol: Option<LiveChart>,
    payoff: Option<LiveChart>,
}

impl<E: ChartEngine> ChartRenderer<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            vol: None,
            payoff: None,
        }
    }

    #[cfg(test)]
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Render both charts from one response. Shape errors are reported
    /// before anything is destroyed, so the previous charts stay up.
    pub fn render(&mut self, data: &PlotData) -> ClientResult<()> {
        data.validate()?;
        self.replace(ChartSlot::Vol, Some(vol::build(data)))?;
        self.replace(ChartSlot::Payoff, payoff::build(data))?;
        Ok(())
    }

    fn replace(&mut self, slot: ChartSlot, spec: Option<ChartSpec>) -> ClientResult<()> {
        if let Some(prev) = self.slot_mut(slot).take() {
            tracing::debug!(slot = slot.as_str(), id = %prev.handle.id(), "destroying chart");
            self.engine.destroy(prev.handle);
        }

        let Some(spec) = spec else {
            return Ok(());
        };

        let handle = self.engine.create(&spec)?;
        debug_assert_eq!(self.engine.live_count(slot), 1, "one live chart per slot");
        tracing::debug!(slot = slot.as_str(), id = %handle.id(), "chart created");
        *self.slot_mut(slot) = Some(LiveChart { handle, spec });
        Ok(())
    }

    fn slot_mut(&mut self, slot: ChartSlot) -> &mut Option<LiveChart> {
        match slot {
            ChartSlot::Vol => &mut self.vol,
            ChartSlot::Payoff => &mut self.payoff,
        }
    }

    fn live(&self, slot: ChartSlot) -> Option<&LiveChart> {
        match slot {
            ChartSlot::Vol => self.vol.as_ref(),
            ChartSlot::Payoff => self.payoff.as_ref(),
        }
    }

    pub fn handle(&self, slot: ChartSlot) -> Option<&ChartHandle> {
        self.live(slot).map(|c| &c.handle)
    }

    pub fn spec(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.live(slot).map(|c| &c.spec)
    }

    pub fn output(&self, slot: ChartSlot) -> Option<&str> {
        self.engine.output(&self.live(slot)?.handle)
    }

    pub fn tooltip(&self, slot: ChartSlot, dataset: usize, index: usize) -> Option<String> {
        self.spec(slot)?.tooltip(dataset, index)
    }
}
