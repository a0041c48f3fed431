// Caller-side layout decisions for the results tooltip
//
// The geometry engine is deliberately dumb: it is told where the anchor is
// and which edge to pin. Deriving the anchor from the hovered element and
// picking over/under from the available space happens here.

use crate::tooltip::geometry::{place, LayoutX, Point, PopupSize, TooltipPlacement, VerticalAlign, Viewport};
use serde::{Deserialize, Serialize};

/// Bounding box of the hovered element, in the same coordinate space as the viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElementRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Per-cell hover configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct HoverSettings {
    pub x: LayoutX,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl HoverSettings {
    pub fn new(x: LayoutX) -> Self {
        Self {
            x,
            ..Default::default()
        }
    }

    /// Anchor point on the element edge the popup attaches to
    pub fn anchor(&self, rect: &ElementRect, vertical: VerticalAlign) -> Point {
        let x = match self.x {
            LayoutX::ElementCenter => rect.left + rect.width / 2.0,
            LayoutX::ElementLeft => rect.left,
            LayoutX::ElementRight => rect.right(),
        };
        let y = match vertical {
            VerticalAlign::Top => rect.bottom() + self.offset_y,
            VerticalAlign::Bottom => rect.top - self.offset_y,
        };
        Point::new(x + self.offset_x, y)
    }
}

/// Pick which popup edge to pin: below the element when it fits, above when
/// only that fits, otherwise whichever side has more room.
pub fn choose_vertical_align(rect: &ElementRect, viewport: Viewport, popup_height: f64) -> VerticalAlign {
    let room_below = viewport.height - rect.bottom();
    let room_above = rect.top;

    if room_below >= popup_height {
        VerticalAlign::Top
    } else if room_above >= popup_height || room_above > room_below {
        VerticalAlign::Bottom
    } else {
        VerticalAlign::Top
    }
}

/// Full layout for a hover event: over/under decision, anchor, placement
pub fn layout_for_hover(
    rect: &ElementRect,
    settings: &HoverSettings,
    viewport: Viewport,
    popup: PopupSize,
) -> TooltipPlacement {
    let vertical = choose_vertical_align(rect, viewport, popup.height);
    let anchor = settings.anchor(rect, vertical);
    place(anchor, settings.x, vertical, viewport, popup)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POPUP: PopupSize = PopupSize {
        width: 400.0,
        height: 400.0,
    };

    #[test]
    fn test_anchor_per_layout() {
        let rect = ElementRect::new(100.0, 50.0, 80.0, 20.0);
        let center = HoverSettings::new(LayoutX::ElementCenter).anchor(&rect, VerticalAlign::Top);
        assert_eq!(center, Point::new(140.0, 70.0));

        let left = HoverSettings::new(LayoutX::ElementLeft).anchor(&rect, VerticalAlign::Bottom);
        assert_eq!(left, Point::new(100.0, 50.0));

        let right = HoverSettings {
            x: LayoutX::ElementRight,
            offset_x: -4.0,
            offset_y: 10.0,
        }
        .anchor(&rect, VerticalAlign::Top);
        assert_eq!(right, Point::new(176.0, 80.0));
    }

    #[test]
    fn test_prefers_below_when_it_fits() {
        let rect = ElementRect::new(100.0, 100.0, 80.0, 20.0);
        let align = choose_vertical_align(&rect, Viewport::new(1280.0, 800.0), 400.0);
        assert_eq!(align, VerticalAlign::Top);
    }

    #[test]
    fn test_flips_above_near_the_bottom() {
        let rect = ElementRect::new(100.0, 600.0, 80.0, 20.0);
        let align = choose_vertical_align(&rect, Viewport::new(1280.0, 800.0), 400.0);
        assert_eq!(align, VerticalAlign::Bottom);
    }

    #[test]
    fn test_short_viewport_uses_larger_side() {
        let rect = ElementRect::new(100.0, 100.0, 80.0, 20.0);
        let align = choose_vertical_align(&rect, Viewport::new(1280.0, 300.0), 400.0);
        assert_eq!(align, VerticalAlign::Top);
    }

    #[test]
    fn test_layout_for_hover_pins_bottom_edge_above_element() {
        let rect = ElementRect::new(600.0, 620.0, 80.0, 20.0);
        let placement = layout_for_hover(
            &rect,
            &HoverSettings::new(LayoutX::ElementCenter),
            Viewport::new(1280.0, 800.0),
            POPUP,
        );
        assert_eq!(placement.vertical_align, VerticalAlign::Bottom);
        assert_eq!(placement.top, 220.0);
        assert_eq!(placement.left, 440.0);
    }
}
