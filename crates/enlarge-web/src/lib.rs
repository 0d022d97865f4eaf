#![cfg_attr(not(target_arch = "wasm32"), forbid(unsafe_code))]

//! WASM frontend for the enlarge viewer.
//!
//! Binds [`enlarge_core::EnlargeController`] to the real document:
//! - a `web-sys` implementation of [`enlarge_core::Dom`],
//! - one listener per [`enlarge_core::LISTENER_BINDINGS`] entry, removed on
//!   `destroy()`,
//! - `tracing` output forwarded to the browser console.
//!
//! With the default `autostart` feature a viewer with default options is
//! mounted when the module starts. Disable it to call `EnlargeViewer.mount`
//! yourself, otherwise the page gets two overlays.

pub mod options;

#[cfg(target_arch = "wasm32")]
mod console;
#[cfg(target_arch = "wasm32")]
mod wasm;
#[cfg(target_arch = "wasm32")]
mod web_dom;

#[cfg(target_arch = "wasm32")]
pub use wasm::EnlargeViewer;

/// Native builds compile this crate as a stub so `cargo check --workspace` stays
/// green on non-wasm targets. There is no document to attach to, so mounting
/// validates the options and reports "no track".
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default)]
pub struct EnlargeViewer;

#[cfg(not(target_arch = "wasm32"))]
impl EnlargeViewer {
    pub fn mount(
        options_json: Option<&str>,
    ) -> Result<Option<Self>, enlarge_core::ConfigError> {
        options::MountOptions::from_json(options_json)?;
        Ok(None)
    }
}
