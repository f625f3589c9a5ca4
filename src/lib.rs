//! # simple-components
//!
//! Embeddable UI widgets that mount into host HTML documents.
//!
//! Two pieces collaborate:
//!
//! - [`registry`] — a shared, denylist-guarded namespace registry where each
//!   widget installs its mount function under a dotted path
//!   (`simpleComponents.Cookie`), so independently packaged widgets expose
//!   discoverable entry points without colliding.
//! - [`factory`] — wraps a [`factory::Component`] into a mount function that
//!   instantiates it into a document and returns a handle with `update` and
//!   `unmount`; unmounting fully reverses any document structure the mount
//!   created.
//!
//! The host page is an in-memory [`kuchiki`] document owned by the embedding
//! application. All operations are synchronous and single-threaded: mount
//! handles and mount functions are `Rc`-based and stay on the thread that
//! owns the document.
//!
//! ```no_run
//! use std::rc::Rc;
//! use simple_components::cookie::register_cookie_banner;
//! use simple_components::dom;
//! use simple_components::factory::{MountOptions, RootTarget};
//! use simple_components::registry::Registry;
//! use simple_components::session::{InMemorySessionStore, SessionStore};
//!
//! # fn main() -> anyhow::Result<()> {
//! let store: Rc<dyn SessionStore> = Rc::new(InMemorySessionStore::new());
//! let mut registry = Registry::new();
//! register_cookie_banner(&mut registry, store)?;
//!
//! let document = dom::parse_document("<html><body><div id=\"host\"></div></body></html>");
//! let mount = registry.mount_fn("simpleComponents.Cookie").unwrap();
//! let handle = mount(
//!     &document,
//!     MountOptions {
//!         root: RootTarget::ReuseSelector("#host".to_string()),
//!         ..Default::default()
//!     },
//! )?;
//! handle.unmount();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod cookie;
pub mod dom;
pub mod factory;
pub mod registry;
pub mod session;

pub use factory::{
    Component, ContainerOptions, MountError, MountFn, MountHandle, MountOptions, Props,
    RenderContext, RootTarget, UnmountTrigger, build_mount_fn, merge_props,
};
pub use registry::{NamespaceEntry, NamespaceTable, RegisterOptions, Registry, RegistryError};
pub use session::{InMemorySessionStore, SessionStore};
