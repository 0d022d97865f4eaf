//! Host events fed into the controller.

use crate::controller::Transition;

/// Where a listener is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// The image track (delegated clicks).
    Track,
    /// The controller-owned overlay.
    Overlay,
    /// The global window.
    Window,
}

/// One DOM listener the host must install after a successful attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerBinding {
    pub target: ListenerTarget,
    /// DOM event type, e.g. `"click"`.
    pub event: &'static str,
}

/// Every listener the controller relies on. Installed once, never rebound.
pub const LISTENER_BINDINGS: [ListenerBinding; 4] = [
    ListenerBinding {
        target: ListenerTarget::Track,
        event: "click",
    },
    ListenerBinding {
        target: ListenerTarget::Overlay,
        event: "click",
    },
    ListenerBinding {
        target: ListenerTarget::Window,
        event: "keydown",
    },
    ListenerBinding {
        target: ListenerTarget::Window,
        event: "dragstart",
    },
];

/// Host event, already decoded from the raw DOM event.
#[derive(Debug, Clone, PartialEq)]
pub enum DomEvent<E> {
    /// `click`; `target` is `None` when the event target is not an element.
    Click { target: Option<E> },
    /// `keydown` with its `KeyboardEvent.key`.
    KeyDown { key: String },
    DragStart,
}

impl<E> DomEvent<E> {
    /// Decode a raw DOM event type into a [`DomEvent`].
    ///
    /// Returns `None` for event types the controller never listens to.
    pub fn from_parts(event_type: &str, target: Option<E>, key: Option<String>) -> Option<Self> {
        match event_type {
            "click" => Some(Self::Click { target }),
            "keydown" => Some(Self::KeyDown {
                key: key.unwrap_or_default(),
            }),
            "dragstart" => Some(Self::DragStart),
            _ => None,
        }
    }
}

/// What the host should do after dispatching an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub transition: Transition,
    /// Call `event.preventDefault()`.
    pub prevent_default: bool,
}

impl Response {
    #[must_use]
    pub const fn transition(transition: Transition) -> Self {
        Self {
            transition,
            prevent_default: false,
        }
    }

    #[must_use]
    pub const fn ignored() -> Self {
        Self::transition(Transition::Unchanged)
    }
}
