//! Results tooltip: placement, hover layout, dismissal and content
//!
//! The geometry engine ([`place`]) is a pure function re-invoked on every
//! hover event. Over/under selection and anchor derivation live in
//! [`hover`]; outside-click dismissal in [`dismiss`]; the text model in
//! [`content`]. [`ResultsTooltip`] ties them together for one table.

pub mod content;
pub mod controller;
pub mod dismiss;
pub mod geometry;
pub mod hover;

pub use content::{ArrowPosition, TooltipContent, TooltipData};
pub use controller::ResultsTooltip;
pub use dismiss::{ClickEvent, DismissGuard, InteractionId};
pub use geometry::{
    place, LayoutX, Point, PopupSize, TooltipPlacement, TransformOrigin, VerticalAlign, Viewport,
};
pub use hover::{choose_vertical_align, layout_for_hover, ElementRect, HoverSettings};
