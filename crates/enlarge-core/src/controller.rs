//! The enlarge state machine.
//!
//! Two states: `Closed` (initial) and `Open`, which holds the source image and
//! the clone shown in the overlay. Holding both in one variant keeps "overlay
//! visible", "clone exists" and "an image is current" in lockstep.
//!
//! Opening locks page scroll by fixing `<body>` at the negated scroll offset;
//! closing reverses that and scrolls back to the saved offset.

use tracing::{debug, trace};

use crate::config::EnlargeConfig;
use crate::dom::Dom;
use crate::error::{DomError, EnlargeError};
use crate::event::{DomEvent, ListenerTarget, Response};

/// Body properties written by the scroll lock, removed again on close.
const SCROLL_LOCK_PROPERTIES: [&str; 4] = ["position", "top", "left", "right"];

/// Observable effect of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Precondition not met; nothing changed.
    Unchanged,
    /// Closed -> Open.
    Opened,
    /// Open -> Closed.
    Closed,
    /// Open -> Open with a different image (close, then open).
    Switched,
}

#[derive(Debug)]
enum State<E> {
    Closed,
    Open { source: E, clone: E },
}

/// Click-to-enlarge controller bound to one track and one overlay.
#[derive(Debug)]
pub struct EnlargeController<D: Dom> {
    dom: D,
    config: EnlargeConfig,
    track: D::Element,
    body: D::Element,
    overlay: D::Element,
    state: State<D::Element>,
    saved_scroll: f64,
}

impl<D: Dom> EnlargeController<D> {
    /// Find the track and install the hidden overlay.
    ///
    /// Returns `Ok(None)` without touching the document when the track does not
    /// exist; the host must then install no listeners.
    pub fn attach(dom: D, config: EnlargeConfig) -> Result<Option<Self>, EnlargeError> {
        config.validate()?;
        let Some(track) = dom.element_by_id(&config.track_id) else {
            debug!(track_id = %config.track_id, "track not found, enlarge viewer disabled");
            return Ok(None);
        };
        let body = dom
            .body()
            .ok_or_else(|| DomError::new("body", "document has no body"))?;

        let overlay = dom.create_element("div")?;
        dom.set_id(&overlay, &config.overlay_id);
        dom.set_attribute(&overlay, "aria-hidden", "true")?;
        for (property, value) in config.overlay_style() {
            dom.set_style(&overlay, property, &value)?;
        }
        dom.append_child(&body, &overlay)?;

        debug!(
            track_id = %config.track_id,
            overlay_id = %config.overlay_id,
            "enlarge viewer attached"
        );
        Ok(Some(Self {
            dom,
            config,
            track,
            body,
            overlay,
            state: State::Closed,
            saved_scroll: 0.0,
        }))
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    /// The source image currently enlarged.
    #[must_use]
    pub fn current(&self) -> Option<&D::Element> {
        match &self.state {
            State::Open { source, .. } => Some(source),
            State::Closed => None,
        }
    }

    /// The copy shown inside the overlay.
    #[must_use]
    pub fn enlarged_clone(&self) -> Option<&D::Element> {
        match &self.state {
            State::Open { clone, .. } => Some(clone),
            State::Closed => None,
        }
    }

    /// Scroll offset captured at open; `0.0` while closed.
    #[must_use]
    pub fn saved_scroll(&self) -> f64 {
        self.saved_scroll
    }

    #[must_use]
    pub fn overlay(&self) -> &D::Element {
        &self.overlay
    }

    #[must_use]
    pub fn track(&self) -> &D::Element {
        &self.track
    }

    #[must_use]
    pub fn config(&self) -> &EnlargeConfig {
        &self.config
    }

    #[must_use]
    pub fn dom(&self) -> &D {
        &self.dom
    }

    /// Show a copy of `image` in the overlay.
    ///
    /// `None` and the already-enlarged image are no-ops. A different open image
    /// is closed first. If presenting fails half-way the controller rolls back
    /// to `Closed` before returning the error.
    pub fn open(&mut self, image: Option<&D::Element>) -> Result<Transition, EnlargeError> {
        let Some(image) = image else {
            trace!("open ignored: no image");
            return Ok(Transition::Unchanged);
        };
        if self.current() == Some(image) {
            trace!("open ignored: image already enlarged");
            return Ok(Transition::Unchanged);
        }

        let transition = match self.close()? {
            Transition::Closed => Transition::Switched,
            _ => Transition::Opened,
        };

        let offset = sanitize_offset(self.dom.scroll_y());
        let clone = self.dom.deep_clone(image)?;
        self.dom.add_class(&clone, &self.config.enlarged_class)?;

        self.saved_scroll = offset;
        self.state = State::Open {
            source: image.clone(),
            clone: clone.clone(),
        };
        if let Err(err) = self.present(&clone, offset) {
            let _ = self.close();
            return Err(err.into());
        }

        debug!(offset, ?transition, "image enlarged");
        Ok(transition)
    }

    fn present(&self, clone: &D::Element, offset: f64) -> Result<(), DomError> {
        for (property, value) in scroll_lock_style(offset) {
            self.dom.set_style(&self.body, property, &value)?;
        }
        self.dom.append_child(&self.overlay, clone)?;
        self.dom.set_style(&self.overlay, "display", "block")?;
        if self.config.sync_aria_hidden {
            self.dom.set_attribute(&self.overlay, "aria-hidden", "false")?;
        }
        Ok(())
    }

    /// Hide the overlay, drop the clone, release the scroll lock.
    ///
    /// Every step runs even if an earlier one fails, so the controller always
    /// ends `Closed`; the first DOM error is returned.
    pub fn close(&mut self) -> Result<Transition, EnlargeError> {
        let State::Open { clone, .. } = std::mem::replace(&mut self.state, State::Closed) else {
            trace!("close ignored: nothing enlarged");
            return Ok(Transition::Unchanged);
        };

        let mut result = Ok(());
        if self.dom.parent(&clone).as_ref() == Some(&self.overlay) {
            result = result.and(self.dom.remove_child(&self.overlay, &clone));
        }
        result = result.and(self.dom.set_style(&self.overlay, "display", "none"));
        if self.config.sync_aria_hidden {
            result = result.and(self.dom.set_attribute(&self.overlay, "aria-hidden", "true"));
        }
        for property in SCROLL_LOCK_PROPERTIES {
            result = result.and(self.dom.remove_style(&self.body, property));
        }

        let offset = self.saved_scroll;
        self.dom.scroll_to(0.0, offset);
        self.saved_scroll = 0.0;

        debug!(offset, "enlarged image closed");
        result?;
        Ok(Transition::Closed)
    }

    /// Route one host event.
    pub fn dispatch(
        &mut self,
        source: ListenerTarget,
        event: DomEvent<D::Element>,
    ) -> Result<Response, EnlargeError> {
        match (source, event) {
            (ListenerTarget::Track, DomEvent::Click { target }) => {
                self.on_track_click(target.as_ref()).map(Response::transition)
            }
            (ListenerTarget::Overlay, DomEvent::Click { .. }) => {
                self.close().map(Response::transition)
            }
            (ListenerTarget::Window, DomEvent::KeyDown { key }) => {
                if self.config.is_close_key(&key) {
                    self.close().map(Response::transition)
                } else {
                    Ok(Response::ignored())
                }
            }
            (ListenerTarget::Window, DomEvent::DragStart) => Ok(Response {
                transition: Transition::Unchanged,
                prevent_default: self.is_open(),
            }),
            (source, event) => {
                trace!(?source, ?event, "event ignored");
                Ok(Response::ignored())
            }
        }
    }

    fn on_track_click(&mut self, target: Option<&D::Element>) -> Result<Transition, EnlargeError> {
        let Some(target) = target else {
            return Ok(Transition::Unchanged);
        };
        let Some(image) = self
            .dom
            .closest_with_class(target, &self.config.image_class)
        else {
            trace!("track click outside any image");
            return Ok(Transition::Unchanged);
        };
        if !self.dom.contains(&self.track, &image) {
            trace!("track click resolved to an image outside the track");
            return Ok(Transition::Unchanged);
        }

        if self.current() == Some(&image)
            || self.dom.has_class(&image, &self.config.enlarged_class)
        {
            self.close()
        } else {
            self.open(Some(&image))
        }
    }

    /// Close if open and remove the overlay from the document.
    pub fn detach(mut self) -> Result<(), EnlargeError> {
        let closed = self.close();
        if let Some(parent) = self.dom.parent(&self.overlay) {
            self.dom.remove_child(&parent, &self.overlay)?;
        }
        debug!(overlay_id = %self.config.overlay_id, "enlarge viewer detached");
        closed.map(|_| ())
    }
}

/// Scroll offsets from the host may be fractional; anything unusable is 0.
fn sanitize_offset(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

fn scroll_lock_style(offset: f64) -> [(&'static str, String); 4] {
    [
        ("position", "fixed".to_string()),
        ("top", format!("-{offset}px")),
        ("left", "0".to_string()),
        ("right", "0".to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryDom, NodeId};
    use pretty_assertions::assert_eq;

    struct Page {
        dom: MemoryDom,
        track: NodeId,
        images: Vec<NodeId>,
        /// Child `<img>` of each image wrapper.
        inner: Vec<NodeId>,
        outside: NodeId,
    }

    fn page() -> Page {
        let dom = MemoryDom::new();
        let body = dom.body_id();
        let track = dom.insert(body, "div", Some("image-track"), &[]);
        let mut images = Vec::new();
        let mut inner = Vec::new();
        for _ in 0..3 {
            let image = dom.insert(track, "figure", None, &["image"]);
            inner.push(dom.insert(image, "img", None, &[]));
            images.push(image);
        }
        let outside = dom.insert(body, "figure", None, &["image"]);
        Page {
            dom,
            track,
            images,
            inner,
            outside,
        }
    }

    fn attach(page: &Page) -> EnlargeController<MemoryDom> {
        EnlargeController::attach(page.dom.clone(), EnlargeConfig::default())
            .unwrap()
            .expect("track exists")
    }

    fn click(ctl: &mut EnlargeController<MemoryDom>, target: NodeId) -> Response {
        ctl.dispatch(
            ListenerTarget::Track,
            DomEvent::Click {
                target: Some(target),
            },
        )
        .unwrap()
    }

    fn display(ctl: &EnlargeController<MemoryDom>) -> Option<String> {
        ctl.dom().style(*ctl.overlay(), "display")
    }

    #[test]
    fn attach_installs_hidden_overlay_on_body() {
        let page = page();
        let ctl = attach(&page);
        let overlay = *ctl.overlay();
        let dom = &page.dom;
        assert_eq!(dom.parent(&overlay), Some(dom.body_id()));
        assert_eq!(dom.element_id(overlay).as_deref(), Some("enlarge-overlay"));
        assert_eq!(dom.attribute(overlay, "aria-hidden").as_deref(), Some("true"));
        assert_eq!(dom.style(overlay, "position").as_deref(), Some("fixed"));
        assert_eq!(dom.style(overlay, "inset").as_deref(), Some("0"));
        assert_eq!(
            dom.style(overlay, "background").as_deref(),
            Some("rgba(0,0,0,0.6)")
        );
        assert_eq!(dom.style(overlay, "z-index").as_deref(), Some("14000"));
        assert_eq!(dom.style(overlay, "cursor").as_deref(), Some("zoom-out"));
        assert_eq!(display(&ctl).as_deref(), Some("none"));
        assert!(!ctl.is_open());
        assert_eq!(ctl.track(), &page.track);
    }

    #[test]
    fn missing_track_attaches_nothing() {
        let dom = MemoryDom::new();
        let before = dom.mutation_count();
        let ctl = EnlargeController::attach(dom.clone(), EnlargeConfig::default()).unwrap();
        assert!(ctl.is_none());
        assert_eq!(dom.mutation_count(), before);
        assert!(dom.children(dom.body_id()).is_empty());
    }

    #[test]
    fn invalid_config_fails_before_touching_dom() {
        let page = page();
        let before = page.dom.mutation_count();
        let config = EnlargeConfig {
            close_keys: Vec::new(),
            ..EnlargeConfig::default()
        };
        let err = EnlargeController::attach(page.dom.clone(), config).unwrap_err();
        assert!(matches!(err, EnlargeError::Config(_)));
        assert_eq!(page.dom.mutation_count(), before);
    }

    #[test]
    fn close_when_closed_is_a_no_op() {
        let page = page();
        let mut ctl = attach(&page);
        let before = page.dom.mutation_count();
        assert_eq!(ctl.close().unwrap(), Transition::Unchanged);
        assert_eq!(page.dom.mutation_count(), before);
        assert_eq!(display(&ctl).as_deref(), Some("none"));
        assert!(page.dom.children(*ctl.overlay()).is_empty());
        assert!(page.dom.scroll_log().is_empty());
    }

    #[test]
    fn open_none_is_a_no_op() {
        let page = page();
        let mut ctl = attach(&page);
        assert_eq!(ctl.open(None).unwrap(), Transition::Unchanged);
        assert!(!ctl.is_open());
    }

    #[test]
    fn open_twice_with_same_image_keeps_one_clone() {
        let page = page();
        let mut ctl = attach(&page);
        let img = page.images[0];
        assert_eq!(ctl.open(Some(&img)).unwrap(), Transition::Opened);
        assert_eq!(ctl.open(Some(&img)).unwrap(), Transition::Unchanged);

        let children = page.dom.children(*ctl.overlay());
        assert_eq!(children.len(), 1);
        assert_eq!(Some(&children[0]), ctl.enlarged_clone());
        assert_eq!(display(&ctl).as_deref(), Some("block"));
        assert!(page.dom.classes(children[0]).contains(&"is-enlarged".to_string()));
        // The source stays in the track, unmarked.
        assert_eq!(page.dom.parent(&img), Some(page.track));
        assert!(!page.dom.has_class(&img, "is-enlarged"));
    }

    #[test]
    fn opening_another_image_replaces_the_clone() {
        let page = page();
        let mut ctl = attach(&page);
        let (a, b) = (page.images[0], page.images[1]);
        ctl.open(Some(&a)).unwrap();
        let clone_a = *ctl.enlarged_clone().unwrap();
        assert_eq!(ctl.open(Some(&b)).unwrap(), Transition::Switched);

        assert_eq!(ctl.current(), Some(&b));
        let children = page.dom.children(*ctl.overlay());
        assert_eq!(children.len(), 1);
        assert_ne!(children[0], clone_a);
        assert!(!page.dom.is_connected(clone_a));
        assert_eq!(display(&ctl).as_deref(), Some("block"));
    }

    #[test]
    fn scroll_offset_round_trips_through_open_and_close() {
        let page = page();
        let mut ctl = attach(&page);
        let body = page.dom.body_id();
        page.dom.set_scroll_y(450.0);

        ctl.open(Some(&page.images[2])).unwrap();
        assert_eq!(ctl.saved_scroll(), 450.0);
        assert_eq!(page.dom.style(body, "position").as_deref(), Some("fixed"));
        assert_eq!(page.dom.style(body, "top").as_deref(), Some("-450px"));
        assert_eq!(page.dom.style(body, "left").as_deref(), Some("0"));
        assert_eq!(page.dom.style(body, "right").as_deref(), Some("0"));

        page.dom.set_scroll_y(0.0);
        assert_eq!(ctl.close().unwrap(), Transition::Closed);
        assert_eq!(page.dom.scroll_log(), vec![(0.0, 450.0)]);
        assert_eq!(page.dom.scroll_y(), 450.0);
        assert_eq!(ctl.saved_scroll(), 0.0);
        for property in SCROLL_LOCK_PROPERTIES {
            assert_eq!(page.dom.style(body, property), None, "{property}");
        }
    }

    #[test]
    fn fractional_and_bogus_offsets() {
        assert_eq!(scroll_lock_style(12.5)[1].1, "-12.5px");
        assert_eq!(scroll_lock_style(0.0)[1].1, "-0px");
        assert_eq!(sanitize_offset(f64::NAN), 0.0);
        assert_eq!(sanitize_offset(-3.0), 0.0);
        assert_eq!(sanitize_offset(7.0), 7.0);
    }

    #[test]
    fn reclicking_the_image_toggles_closed() {
        let page = page();
        let mut ctl = attach(&page);
        let x = page.images[1];
        assert_eq!(click(&mut ctl, x).transition, Transition::Opened);
        assert_eq!(ctl.current(), Some(&x));
        assert_eq!(click(&mut ctl, x).transition, Transition::Closed);
        assert_eq!(ctl.current(), None);
        assert_eq!(display(&ctl).as_deref(), Some("none"));
    }

    #[test]
    fn click_on_nested_child_resolves_to_image() {
        let page = page();
        let mut ctl = attach(&page);
        assert_eq!(click(&mut ctl, page.inner[0]).transition, Transition::Opened);
        assert_eq!(ctl.current(), Some(&page.images[0]));
    }

    #[test]
    fn clicks_outside_images_or_track_are_ignored() {
        let page = page();
        let mut ctl = attach(&page);
        assert_eq!(click(&mut ctl, page.track).transition, Transition::Unchanged);
        assert_eq!(click(&mut ctl, page.outside).transition, Transition::Unchanged);
        let none = ctl
            .dispatch(ListenerTarget::Track, DomEvent::Click { target: None })
            .unwrap();
        assert_eq!(none, Response::ignored());
        assert!(!ctl.is_open());
    }

    #[test]
    fn overlay_click_closes() {
        let page = page();
        let mut ctl = attach(&page);
        ctl.open(Some(&page.images[0])).unwrap();
        let clone = *ctl.enlarged_clone().unwrap();
        let response = ctl
            .dispatch(
                ListenerTarget::Overlay,
                DomEvent::Click {
                    target: Some(clone),
                },
            )
            .unwrap();
        assert_eq!(response.transition, Transition::Closed);
        assert!(page.dom.children(*ctl.overlay()).is_empty());
    }

    #[test]
    fn escape_and_legacy_esc_close() {
        let page = page();
        let mut ctl = attach(&page);
        for key in ["Escape", "Esc"] {
            ctl.open(Some(&page.images[0])).unwrap();
            let response = ctl
                .dispatch(
                    ListenerTarget::Window,
                    DomEvent::KeyDown { key: key.into() },
                )
                .unwrap();
            assert_eq!(response.transition, Transition::Closed, "{key}");
            assert_eq!(display(&ctl).as_deref(), Some("none"));
            assert_eq!(ctl.current(), None);
        }
    }

    #[test]
    fn other_keys_leave_overlay_open() {
        let page = page();
        let mut ctl = attach(&page);
        ctl.open(Some(&page.images[0])).unwrap();
        let response = ctl
            .dispatch(
                ListenerTarget::Window,
                DomEvent::KeyDown { key: "Enter".into() },
            )
            .unwrap();
        assert_eq!(response, Response::ignored());
        assert!(ctl.is_open());
    }

    #[test]
    fn dragstart_is_prevented_only_while_open() {
        let page = page();
        let mut ctl = attach(&page);
        let closed = ctl
            .dispatch(ListenerTarget::Window, DomEvent::DragStart)
            .unwrap();
        assert!(!closed.prevent_default);
        ctl.open(Some(&page.images[0])).unwrap();
        let open = ctl
            .dispatch(ListenerTarget::Window, DomEvent::DragStart)
            .unwrap();
        assert!(open.prevent_default);
        assert_eq!(open.transition, Transition::Unchanged);
    }

    #[test]
    fn aria_hidden_is_static_by_default() {
        let page = page();
        let mut ctl = attach(&page);
        ctl.open(Some(&page.images[0])).unwrap();
        assert_eq!(
            page.dom.attribute(*ctl.overlay(), "aria-hidden").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn aria_hidden_follows_state_when_synced() {
        let page = page();
        let config = EnlargeConfig {
            sync_aria_hidden: true,
            ..EnlargeConfig::default()
        };
        let mut ctl = EnlargeController::attach(page.dom.clone(), config)
            .unwrap()
            .unwrap();
        let overlay = *ctl.overlay();
        ctl.open(Some(&page.images[0])).unwrap();
        assert_eq!(page.dom.attribute(overlay, "aria-hidden").as_deref(), Some("false"));
        ctl.close().unwrap();
        assert_eq!(page.dom.attribute(overlay, "aria-hidden").as_deref(), Some("true"));
    }

    #[test]
    fn close_tolerates_clone_removed_by_someone_else() {
        let page = page();
        let mut ctl = attach(&page);
        ctl.open(Some(&page.images[0])).unwrap();
        let clone = *ctl.enlarged_clone().unwrap();
        page.dom.remove_child(ctl.overlay(), &clone).unwrap();
        assert_eq!(ctl.close().unwrap(), Transition::Closed);
        assert!(!ctl.is_open());
    }

    #[test]
    fn detach_closes_and_removes_overlay() {
        let page = page();
        let mut ctl = attach(&page);
        page.dom.set_scroll_y(80.0);
        ctl.open(Some(&page.images[0])).unwrap();
        let overlay = *ctl.overlay();
        ctl.detach().unwrap();
        assert!(!page.dom.is_connected(overlay));
        assert_eq!(page.dom.element_by_id("enlarge-overlay"), None);
        assert_eq!(page.dom.style(page.dom.body_id(), "position"), None);
        assert_eq!(page.dom.scroll_y(), 80.0);
    }

    #[test]
    fn custom_classes_are_honoured() {
        let dom = MemoryDom::new();
        let track = dom.insert(dom.body_id(), "ul", Some("gallery"), &[]);
        let plain = dom.insert(track, "li", None, &["image"]);
        let thumb = dom.insert(track, "li", None, &["thumb"]);
        let config = EnlargeConfig::from_json_str(
            r#"{"trackId":"gallery","imageClass":"thumb","enlargedClass":"big"}"#,
        )
        .unwrap();
        let mut ctl = EnlargeController::attach(dom.clone(), config).unwrap().unwrap();
        assert_eq!(click(&mut ctl, plain).transition, Transition::Unchanged);
        assert_eq!(click(&mut ctl, thumb).transition, Transition::Opened);
        let clone = *ctl.enlarged_clone().unwrap();
        assert!(dom.has_class(&clone, "big"));
    }
}
