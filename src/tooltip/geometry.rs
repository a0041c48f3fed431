// Tooltip placement
//
// Pure layout function: anchor point, horizontal alignment intent, vertical
// intent, viewport and popup footprint in, absolute placement out. It does
// not pick top vs bottom itself (see `hover::choose_vertical_align`) and it
// never fails; out-of-range numbers are clamped.

use crate::config::TooltipConfig;
use serde::{Deserialize, Serialize};

/// Horizontal alignment of the popup relative to the hovered element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutX {
    #[default]
    ElementCenter,
    ElementLeft,
    ElementRight,
}

impl LayoutX {
    /// Arrow position along the popup's horizontal edge, in percent
    pub fn arrow_percent(self) -> f64 {
        match self {
            LayoutX::ElementRight => 3.0,
            LayoutX::ElementLeft => 97.0,
            LayoutX::ElementCenter => 50.0,
        }
    }
}

/// Which popup edge is pinned to the anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Top edge at the anchor, popup hangs below, arrow on top
    #[default]
    Top,
    /// Bottom edge at the anchor, popup sits above, arrow at the bottom
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PopupSize {
    pub width: f64,
    pub height: f64,
}

impl From<TooltipConfig> for PopupSize {
    fn from(config: TooltipConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}

/// Origin the open/close animation scales from, in percent of the popup box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformOrigin {
    pub x_percent: f64,
    pub y_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    /// Arrow position along the horizontal edge, percent
    pub arrow_offset: f64,
    pub vertical_align: VerticalAlign,
    pub transform_origin: TransformOrigin,
}

impl TooltipPlacement {
    pub fn arrow_offset_css(&self) -> String {
        format!("{}%", self.arrow_offset)
    }

    pub fn transform_origin_css(&self) -> String {
        format!(
            "{}% {}%",
            self.transform_origin.x_percent, self.transform_origin.y_percent
        )
    }
}

/// Compute the popup placement
///
/// `left` is clamped into the viewport. The arrow keeps its fixed 3/50/97%
/// offset regardless, so once `left` has been clamped the arrow no longer
/// sits over the anchor.
///
/// # Example
/// ```
/// use abverdict::tooltip::{place, LayoutX, Point, PopupSize, VerticalAlign, Viewport};
///
/// let placement = place(
///     Point::new(600.0, 200.0),
///     LayoutX::ElementLeft,
///     VerticalAlign::Top,
///     Viewport::new(1280.0, 800.0),
///     PopupSize { width: 400.0, height: 400.0 },
/// );
/// assert_eq!(placement.arrow_offset, 97.0);
/// assert_eq!(placement.left, 600.0 - 400.0 * 0.97);
/// ```
pub fn place(
    anchor: Point,
    layout_x: LayoutX,
    vertical: VerticalAlign,
    viewport: Viewport,
    popup: PopupSize,
) -> TooltipPlacement {
    let viewport_width = sanitize(viewport.width);
    let width = sanitize(popup.width).min(viewport_width);
    let height = sanitize(popup.height);

    let arrow_offset = layout_x.arrow_percent();
    let fraction = arrow_offset / 100.0;
    let max_left = (viewport_width - width).max(0.0);
    let left = (finite_or_zero(anchor.x) - width * fraction).clamp(0.0, max_left);

    let anchor_y = finite_or_zero(anchor.y);
    let top = match vertical {
        VerticalAlign::Top => anchor_y,
        VerticalAlign::Bottom => anchor_y - height,
    };

    TooltipPlacement {
        left,
        top,
        width,
        height,
        arrow_offset,
        vertical_align: vertical,
        transform_origin: TransformOrigin {
            x_percent: arrow_offset,
            y_percent: match vertical {
                VerticalAlign::Top => 0.0,
                VerticalAlign::Bottom => 100.0,
            },
        },
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Sizes: non-finite or negative become 0
fn sanitize(size: f64) -> f64 {
    finite_or_zero(size).max(0.0)
}
