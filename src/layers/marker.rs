use crate::{
    core::{
        constants::{FALLBACK_TOOLTIP, MARKER_ICON_ANCHOR, MARKER_ICON_SIZE},
        geo::LatLng,
    },
    data::geojson::{display_value, is_truthy, FeatureRecord},
    input::events::{EventHandled, InputEvent},
    ui::panel::ContentPayload,
};
use std::sync::Arc;

/// Identifies a marker within one map instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

/// Invoked when a marker is clicked or activated with Enter
pub type SelectHandler = Arc<dyn Fn(&Marker) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    /// `None` lets the rendering library use its default pin
    pub url: Option<String>,
    pub size: (u32, u32),
    pub anchor: (u32, u32),
}

impl MarkerIcon {
    pub fn new(url: Option<String>) -> Self {
        Self {
            url,
            size: MARKER_ICON_SIZE,
            anchor: MARKER_ICON_ANCHOR,
        }
    }
}

/// An interactive marker for one point feature
pub struct Marker {
    id: MarkerId,
    position: LatLng,
    icon: MarkerIcon,
    tooltip: String,
    feature: Arc<FeatureRecord>,
    on_select: SelectHandler,
}

impl Marker {
    pub fn new(
        id: MarkerId,
        position: LatLng,
        icon: MarkerIcon,
        feature: Arc<FeatureRecord>,
        on_select: SelectHandler,
    ) -> Self {
        let tooltip = tooltip_for(&feature);
        Self {
            id,
            position,
            icon,
            tooltip,
            feature,
            on_select,
        }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    pub fn position(&self) -> LatLng {
        self.position
    }

    pub fn icon(&self) -> &MarkerIcon {
        &self.icon
    }

    pub fn tooltip(&self) -> &str {
        &self.tooltip
    }

    pub fn feature(&self) -> &FeatureRecord {
        &self.feature
    }

    /// What the details panel shows for this marker
    pub fn content(&self) -> ContentPayload {
        ContentPayload::from_properties(self.feature.properties())
    }

    /// Click and Enter both run the selection action
    pub fn handle_event(&self, event: &InputEvent) -> EventHandled {
        if event.is_activation() {
            self.select();
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    pub fn select(&self) {
        (self.on_select)(self)
    }
}

impl std::fmt::Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marker")
            .field("id", &self.id)
            .field("position", &self.position)
            .field("tooltip", &self.tooltip)
            .finish_non_exhaustive()
    }
}

/// First property value, or "Item" when there is no usable one
fn tooltip_for(feature: &FeatureRecord) -> String {
    feature
        .first_property()
        .filter(|value| is_truthy(value))
        .map(display_value)
        .unwrap_or_else(|| FALLBACK_TOOLTIP.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::events::{KeyCode, KeyModifiers};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn feature(properties: serde_json::Value) -> Arc<FeatureRecord> {
        Arc::new(FeatureRecord {
            properties: properties.as_object().cloned(),
            ..Default::default()
        })
    }

    fn marker(properties: serde_json::Value, on_select: SelectHandler) -> Marker {
        Marker::new(
            MarkerId(1),
            LatLng::new(45.0, -75.0),
            MarkerIcon::new(Some("pin.svg".to_string())),
            feature(properties),
            on_select,
        )
    }

    fn noop() -> SelectHandler {
        Arc::new(|_| {})
    }

    #[test]
    fn test_tooltip_uses_first_property() {
        let m = marker(json!({ "name": "Ottawa", "units": 12 }), noop());
        assert_eq!(m.tooltip(), "Ottawa");

        let numeric = marker(json!({ "units": 12, "name": "Ottawa" }), noop());
        assert_eq!(numeric.tooltip(), "12");
    }

    #[test]
    fn test_tooltip_fallback() {
        assert_eq!(marker(json!({}), noop()).tooltip(), "Item");
        assert_eq!(marker(json!(null), noop()).tooltip(), "Item");
        assert_eq!(marker(json!({ "name": "" }), noop()).tooltip(), "Item");
    }

    #[test]
    fn test_icon_geometry() {
        let m = marker(json!({}), noop());
        assert_eq!(m.icon().size, (30, 30));
        assert_eq!(m.icon().anchor, (0, 0));
        assert_eq!(m.icon().url.as_deref(), Some("pin.svg"));
    }

    #[test]
    fn test_click_and_enter_select() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let m = marker(
            json!({ "name": "x" }),
            Arc::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(m.handle_event(&InputEvent::click()), EventHandled::Handled);
        assert_eq!(m.handle_event(&InputEvent::key(KeyCode::Enter)), EventHandled::Handled);
        assert_eq!(
            m.handle_event(&InputEvent::key_with(KeyCode::Tab, KeyModifiers::SHIFT)),
            EventHandled::NotHandled
        );
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_content_from_properties() {
        let m = marker(json!({ "name": "Ottawa" }), noop());
        assert_eq!(
            m.content(),
            ContentPayload::KeyValueList(vec![("name".to_string(), "Ottawa".to_string())])
        );

        let empty = marker(json!({}), noop());
        assert_eq!(empty.content(), ContentPayload::Text("No properties".to_string()));
    }
}
