pub mod panel;
pub mod style;

pub use panel::{ContentPayload, DetailPanelController, PanelElement, PanelView};
pub use style::{MarkerStyle, PanelStyle};
