use std::cell::RefCell;
use std::rc::Rc;

use enlarge_core::{
    DomEvent, EnlargeController, EnlargeError, LISTENER_BINDINGS, ListenerBinding, ListenerTarget,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Element, Event, EventTarget, KeyboardEvent};

use crate::console;
use crate::options::MountOptions;
use crate::web_dom::WebDom;

type SharedController = Rc<RefCell<Option<EnlargeController<WebDom>>>>;

/// An installed DOM listener; removed from its target on drop.
struct Listener {
    target: EventTarget,
    event: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn install(
        controller: &SharedController,
        binding: ListenerBinding,
        target: EventTarget,
    ) -> Result<Self, JsValue> {
        let source = binding.target;
        let callback = {
            let controller = Rc::clone(controller);
            Closure::wrap(Box::new(move |event: Event| {
                // A listener fired from inside another one; the outer call owns the state.
                let Ok(mut slot) = controller.try_borrow_mut() else {
                    return;
                };
                let Some(ctl) = slot.as_mut() else {
                    return;
                };
                let Some(dom_event) = decode(&event) else {
                    return;
                };
                match ctl.dispatch(source, dom_event) {
                    Ok(response) => {
                        if response.prevent_default {
                            event.prevent_default();
                        }
                    }
                    Err(err) => {
                        warn!(%err, event = %event.type_(), "enlarge event handling failed");
                    }
                }
            }) as Box<dyn FnMut(Event)>)
        };
        target.add_event_listener_with_callback(binding.event, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target,
            event: binding.event,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.event, self.callback.as_ref().unchecked_ref());
    }
}

fn decode(event: &Event) -> Option<DomEvent<Element>> {
    let target = event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok());
    let key = event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key);
    DomEvent::from_parts(&event.type_(), target, key)
}

fn to_js(err: EnlargeError) -> JsValue {
    JsValue::from_str(&format!("enlarge: {err}"))
}

fn options_json(options: Option<JsValue>) -> Result<Option<String>, JsValue> {
    let Some(options) = options else {
        return Ok(None);
    };
    if options.is_null() || options.is_undefined() {
        return Ok(None);
    }
    let json = js_sys::JSON::stringify(&options)?;
    Ok(Some(String::from(json)))
}

/// Click-to-enlarge viewer bound to the page's image track.
///
/// JS surface:
/// - `EnlargeViewer.mount(options?)` returns a viewer, or `undefined` when the
///   track is not on the page,
/// - `open(element)`, `close()`, `isOpen()`,
/// - `destroy()` removes the listeners and the overlay.
#[wasm_bindgen]
pub struct EnlargeViewer {
    controller: SharedController,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl EnlargeViewer {
    pub fn mount(options: Option<JsValue>) -> Result<Option<EnlargeViewer>, JsValue> {
        let json = options_json(options)?;
        let options = MountOptions::from_json(json.as_deref())
            .map_err(|err| to_js(EnlargeError::Config(err)))?;
        console::init(options.log_level);

        let dom = WebDom::from_window()
            .ok_or_else(|| JsValue::from_str("enlarge: no window or document"))?;
        let window: EventTarget = dom.window().clone().into();
        let Some(controller) = EnlargeController::attach(dom, options.config).map_err(to_js)?
        else {
            return Ok(None);
        };

        let track: EventTarget = controller.track().clone().into();
        let overlay: EventTarget = controller.overlay().clone().into();
        let shared: SharedController = Rc::new(RefCell::new(Some(controller)));
        let mut viewer = Self {
            controller: Rc::clone(&shared),
            listeners: Vec::with_capacity(LISTENER_BINDINGS.len()),
        };
        for binding in LISTENER_BINDINGS {
            let target = match binding.target {
                ListenerTarget::Track => track.clone(),
                ListenerTarget::Overlay => overlay.clone(),
                ListenerTarget::Window => window.clone(),
            };
            // On failure `viewer` drops, removing whatever was installed so far.
            viewer
                .listeners
                .push(Listener::install(&shared, binding, target)?);
        }
        debug!(listeners = viewer.listeners.len(), "enlarge viewer mounted");
        Ok(Some(viewer))
    }

    /// Enlarge `element`. `null`, or the element already enlarged, is a no-op.
    pub fn open(&self, element: Option<Element>) -> Result<(), JsValue> {
        self.with_controller(|ctl| ctl.open(element.as_ref()).map(|_| ()))
    }

    pub fn close(&self) -> Result<(), JsValue> {
        self.with_controller(|ctl| ctl.close().map(|_| ()))
    }

    #[wasm_bindgen(js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.controller
            .try_borrow()
            .map(|slot| slot.as_ref().is_some_and(EnlargeController::is_open))
            .unwrap_or(false)
    }

    /// Explicit teardown for JS callers: remove listeners, close, and drop the
    /// overlay. Later calls on this viewer are no-ops.
    pub fn destroy(&mut self) -> Result<(), JsValue> {
        self.listeners.clear();
        let controller = self
            .controller
            .try_borrow_mut()
            .ok()
            .and_then(|mut slot| slot.take());
        match controller {
            Some(ctl) => ctl.detach().map_err(to_js),
            None => Ok(()),
        }
    }
}

impl EnlargeViewer {
    fn with_controller(
        &self,
        f: impl FnOnce(&mut EnlargeController<WebDom>) -> Result<(), EnlargeError>,
    ) -> Result<(), JsValue> {
        let Ok(mut slot) = self.controller.try_borrow_mut() else {
            return Ok(());
        };
        match slot.as_mut() {
            Some(ctl) => f(ctl).map_err(to_js),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "autostart")]
thread_local! {
    static AUTOSTARTED: RefCell<Option<EnlargeViewer>> = const { RefCell::new(None) };
}

/// Mount with default options at module start, the way the stock page
/// expects. The viewer lives for the rest of the page.
#[cfg(feature = "autostart")]
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let viewer = EnlargeViewer::mount(None)?;
    AUTOSTARTED.with(|slot| *slot.borrow_mut() = viewer);
    Ok(())
}
