// Open/close lifecycle of the results tooltip
//
// Ties hover layout, placement and outside-click dismissal together for one
// results table. Placement is recomputed on every hover; nothing about a
// previous placement is retained.

use crate::config::TooltipConfig;
use crate::display::ValueFormatter;
use crate::tooltip::content::{TooltipContent, TooltipData};
use crate::tooltip::dismiss::{ClickEvent, DismissGuard, InteractionId};
use crate::tooltip::geometry::{PopupSize, TooltipPlacement, Viewport};
use crate::tooltip::hover::{layout_for_hover, ElementRect, HoverSettings};

#[derive(Debug)]
struct OpenTooltip {
    data: TooltipData,
    placement: TooltipPlacement,
}

#[derive(Debug)]
pub struct ResultsTooltip {
    popup: PopupSize,
    open: Option<OpenTooltip>,
    guard: DismissGuard,
}

impl ResultsTooltip {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            popup: config.into(),
            open: None,
            guard: DismissGuard::new(),
        }
    }

    /// Open (or retarget) the tooltip for a hovered cell
    pub fn open(
        &mut self,
        mut data: TooltipData,
        rect: &ElementRect,
        settings: &HoverSettings,
        viewport: Viewport,
        opened_by: InteractionId,
    ) -> TooltipPlacement {
        let placement = layout_for_hover(rect, settings, viewport, self.popup);
        data.layout_x = settings.x;
        data.y_align = placement.vertical_align;

        self.open = Some(OpenTooltip { data, placement });
        self.guard.arm(opened_by);
        placement
    }

    /// Recompute placement after the pointer or viewport moved
    pub fn reposition(
        &mut self,
        rect: &ElementRect,
        settings: &HoverSettings,
        viewport: Viewport,
    ) -> Option<TooltipPlacement> {
        let popup = self.popup;
        let open = self.open.as_mut()?;
        let placement = layout_for_hover(rect, settings, viewport, popup);
        open.data.layout_x = settings.x;
        open.data.y_align = placement.vertical_align;
        open.placement = placement;
        Some(placement)
    }

    /// Route a document click; returns true when it closed the tooltip
    pub fn click(&mut self, event: &ClickEvent) -> bool {
        if self.guard.handle_click(event) {
            self.open = None;
            true
        } else {
            false
        }
    }

    pub fn close(&mut self) {
        self.open = None;
        self.guard.disarm();
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn is_listening(&self) -> bool {
        self.guard.is_armed()
    }

    pub fn placement(&self) -> Option<&TooltipPlacement> {
        self.open.as_ref().map(|open| &open.placement)
    }

    pub fn data(&self) -> Option<&TooltipData> {
        self.open.as_ref().map(|open| &open.data)
    }

    pub fn content(&self, formatter: &dyn ValueFormatter) -> Option<TooltipContent> {
        self.data().map(|data| TooltipContent::build(data, formatter))
    }
}

impl Default for ResultsTooltip {
    fn default() -> Self {
        Self::new(TooltipConfig::default())
    }
}
