//! Accessible details panel
//!
//! A side panel mounted as a custom map control. It slides in when a marker
//! is selected, traps keyboard focus while open and hands focus back to the
//! selected marker (or the map) when closed.
//!
//! Lifecycle is `Closed -> Open -> Closing -> Closed`; the final transition
//! runs after [`PANEL_CLOSE_DELAY`] on a cancellable task, and any `open()`
//! in between invalidates it. Without an event loop to run that task the
//! close completes immediately.

use crate::{
    core::{
        constants::{NO_PROPERTIES_TEXT, PANEL_CLOSE_DELAY},
        session::{PanelState, SharedSession},
    },
    data::geojson::{display_value, Properties},
    input::events::{EventHandled, InputEvent, KeyCode},
    runtime::{self, AsyncHandle},
    surface::{FocusTarget, MapSurface},
    ui::style::PanelStyle,
};
use std::{
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

/// Text shown by a freshly created panel before any selection
pub const INITIAL_PANEL_TEXT: &str = "This is the panel content.";

/// What the panel body displays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPayload {
    /// Rendered verbatim
    Text(String),
    /// Rendered as an alternating-background list, in order
    KeyValueList(Vec<(String, String)>),
}

impl ContentPayload {
    /// Panel content for a feature's properties: one row per property, or
    /// the "No properties" text when there are none.
    pub fn from_properties(properties: Option<&Properties>) -> Self {
        match properties {
            Some(props) if !props.is_empty() => ContentPayload::KeyValueList(
                props
                    .iter()
                    .map(|(key, value)| (key.clone(), display_value(value)))
                    .collect(),
            ),
            _ => ContentPayload::Text(NO_PROPERTIES_TEXT.to_string()),
        }
    }

    /// Header text: the text itself, or the first value of the list
    pub fn header_text(&self) -> &str {
        match self {
            ContentPayload::Text(text) => text,
            ContentPayload::KeyValueList(rows) => {
                rows.first().map(|(_, value)| value.as_str()).unwrap_or("")
            }
        }
    }
}

/// Focusable parts of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelElement {
    /// The panel itself; receives focus when the panel opens
    Container,
    CloseButton,
    /// A list row, by index
    Row(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHeader {
    pub text: String,
    pub aria_label: String,
    /// Tooltip, mirrors `text`
    pub title: String,
    pub close_button_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelRow {
    pub key: String,
    pub value: String,
    pub background: String,
    pub tab_index: i32,
    pub key_label: String,
    pub value_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelBody {
    Text(String),
    List(Vec<PanelRow>),
}

/// Render model of the panel handed to the map surface
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    /// Horizontal offset: `-width` when slid out, `0` when shown
    pub offset_px: i32,
    pub width_px: i32,
    /// `Some(0)` while shown; `None` takes the panel out of the tab order
    pub tab_index: Option<i32>,
    pub style: PanelStyle,
    pub header: PanelHeader,
    pub body: PanelBody,
}

impl PanelView {
    fn new(style: PanelStyle) -> Self {
        Self {
            offset_px: -style.width_px,
            width_px: style.width_px,
            tab_index: None,
            header: PanelHeader {
                text: String::new(),
                aria_label: "Title".to_string(),
                title: String::new(),
                close_button_title: "Close panel".to_string(),
            },
            body: PanelBody::Text(INITIAL_PANEL_TEXT.to_string()),
            style,
        }
    }

    pub fn is_shown(&self) -> bool {
        self.offset_px == 0
    }

    fn slide_in(&mut self) {
        self.offset_px = 0;
        self.tab_index = Some(0);
    }

    fn slide_out(&mut self) {
        self.offset_px = -self.width_px;
        self.tab_index = None;
    }

    fn render(&mut self, content: &ContentPayload) {
        let header = content.header_text().to_string();
        self.header.title = header.clone();
        self.header.text = header;

        self.body = match content {
            ContentPayload::Text(text) => PanelBody::Text(text.clone()),
            ContentPayload::KeyValueList(rows) => PanelBody::List(
                rows.iter()
                    .enumerate()
                    .map(|(i, (key, value))| PanelRow {
                        key: key.clone(),
                        value: value.clone(),
                        background: self.style.row_background(i).to_string(),
                        tab_index: 0,
                        key_label: "Key".to_string(),
                        value_label: "Value".to_string(),
                    })
                    .collect(),
            ),
        };
    }

    /// Focusable descendants in tab order
    pub fn focus_order(&self) -> Vec<PanelElement> {
        let rows = match &self.body {
            PanelBody::List(rows) => rows.len(),
            PanelBody::Text(_) => 0,
        };
        std::iter::once(PanelElement::CloseButton)
            .chain((0..rows).map(PanelElement::Row))
            .collect()
    }
}

struct PanelInner {
    /// Created on first `open()`
    view: Option<PanelView>,
    mounted: bool,
    pending_close: Option<Box<dyn AsyncHandle>>,
}

/// Owns the details panel of one map instance
pub struct DetailPanelController {
    surface: Arc<dyn MapSurface>,
    session: SharedSession,
    style: PanelStyle,
    close_delay: Duration,
    inner: Mutex<PanelInner>,
}

impl DetailPanelController {
    pub fn new(surface: Arc<dyn MapSurface>, session: SharedSession) -> Self {
        Self::with_options(surface, session, PanelStyle::default(), PANEL_CLOSE_DELAY)
    }

    pub fn with_options(
        surface: Arc<dyn MapSurface>,
        session: SharedSession,
        style: PanelStyle,
        close_delay: Duration,
    ) -> Self {
        Self {
            surface,
            session,
            style,
            close_delay,
            inner: Mutex::new(PanelInner {
                view: None,
                mounted: false,
                pending_close: None,
            }),
        }
    }

    /// Slides the panel in and moves focus into it. Invalidates any close
    /// still waiting for its animation.
    pub fn open(&self) {
        {
            let mut inner = self.inner();
            if let Some(pending) = inner.pending_close.take() {
                pending.cancel();
            }

            let style = self.style.clone();
            let view = inner.view.get_or_insert_with(|| PanelView::new(style));
            view.slide_in();
            let view = view.clone();

            if inner.mounted {
                self.surface.update_panel(&view);
            } else {
                self.surface.mount_panel(&view);
                inner.mounted = true;
            }
        }

        let session = self.session.lock().begin_panel_session();
        log::debug!("details panel opened (session {})", session);
        self.surface.focus(FocusTarget::Panel(PanelElement::Container));
    }

    /// Slides the panel out, removes it from the tab order and returns
    /// focus to the selected marker, or to the map when there is none.
    pub fn close(&self) {
        {
            let mut inner = self.inner();
            if inner.mounted {
                if let Some(view) = inner.view.as_mut() {
                    view.slide_out();
                }
                self.surface.unmount_panel();
                inner.mounted = false;
            }
        }

        let (highlighted, closing) = {
            let mut session = self.session.lock();
            let closing = (session.panel_state() == PanelState::Open)
                .then(|| session.begin_closing());
            (session.highlighted(), closing)
        };

        self.surface.focus(match highlighted {
            Some(marker) => FocusTarget::Marker(marker),
            None => FocusTarget::Map,
        });

        if let Some(id) = closing {
            let session = self.session.clone();
            let scheduled = runtime::spawn_after(self.close_delay, move || {
                finish_close(&session, id);
            });
            let stale = match scheduled {
                Some(handle) => self.inner().pending_close.replace(handle),
                None => {
                    // Nothing will run the timer: skip the animation delay
                    finish_close(&self.session, id);
                    self.inner().pending_close.take()
                }
            };
            if let Some(stale) = stale {
                stale.cancel();
            }
        }
    }

    /// Opens a closed (or closing) panel and closes an open one
    pub fn toggle(&self) {
        match self.state() {
            PanelState::Open => self.close(),
            PanelState::Closed | PanelState::Closing => self.open(),
        }
    }

    /// Replaces the body and syncs the header to the content
    pub fn set_content(&self, content: ContentPayload) {
        let mut inner = self.inner();
        let style = self.style.clone();
        let view = inner.view.get_or_insert_with(|| PanelView::new(style));
        view.render(&content);
        let view = view.clone();
        if inner.mounted {
            self.surface.update_panel(&view);
        }
    }

    /// Keyboard handling inside the panel. `focused` is the panel element
    /// holding focus when the key was pressed.
    ///
    /// While open: Escape closes; Tab on the last element wraps to the
    /// first and Shift+Tab on the first wraps to the last. Every other key
    /// keeps its default behaviour.
    pub fn handle_key(&self, event: &InputEvent, focused: Option<PanelElement>) -> EventHandled {
        let InputEvent::KeyPress { key, modifiers } = event else {
            return EventHandled::NotHandled;
        };
        if self.state() != PanelState::Open {
            return EventHandled::NotHandled;
        }

        match key {
            KeyCode::Escape => {
                self.close();
                EventHandled::Handled
            }
            KeyCode::Tab => {
                let order = match self.inner().view.as_ref() {
                    Some(view) => view.focus_order(),
                    None => return EventHandled::NotHandled,
                };
                let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
                    return EventHandled::NotHandled;
                };

                let target = if modifiers.shift {
                    (focused == Some(first)).then_some(last)
                } else {
                    (focused == Some(last)).then_some(first)
                };
                match target {
                    Some(element) => {
                        self.surface.focus(FocusTarget::Panel(element));
                        EventHandled::Handled
                    }
                    None => EventHandled::NotHandled,
                }
            }
            _ => EventHandled::NotHandled,
        }
    }

    pub fn state(&self) -> PanelState {
        self.session.panel_state()
    }

    /// True from `open()` until a close has finished its animation
    pub fn is_open(&self) -> bool {
        self.state().is_open()
    }

    /// Current render model, if the panel was ever created
    pub fn view(&self) -> Option<PanelView> {
        self.inner().view.clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.inner().mounted
    }

    fn inner(&self) -> MutexGuard<'_, PanelInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn finish_close(session: &SharedSession, id: u64) {
    if session.lock().finish_closing(id) {
        log::debug!("details panel closed (session {})", id);
    }
}

impl Drop for DetailPanelController {
    fn drop(&mut self) {
        if let Some(pending) = self.inner().pending_close.take() {
            pending.cancel();
        }
    }
}
