use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use kuchiki::NodeRef;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::dom;

/// Widget props as embedders pass them: a flat JSON object merged shallowly,
/// later keys winning.
pub type Props = serde_json::Map<String, serde_json::Value>;

/// Mount function produced by [`build_mount_fn`] and installed on the
/// registry. The host document is an explicit argument; there is no ambient
/// page the way a browser global provides one.
pub type MountFn = Rc<dyn Fn(&NodeRef, MountOptions) -> Result<MountHandle, MountError>>;

#[derive(Debug, Error)]
pub enum MountError {
    #[error("root element not found: {0}")]
    RootNotFound(String),
    #[error("html manipulation failed: {0}")]
    Html(String),
}

/// A widget the factory can instantiate. Components are stateless from the
/// factory's perspective; everything they render is derived from the current
/// props.
pub trait Component {
    /// Render the component to an HTML fragment for the given props.
    fn render(&self, props: &Props, ctx: &RenderContext) -> String;
}

/// Where to mount, and who owns the container afterwards.
///
/// Ownership is carried by the variant itself: `CreateNew` containers belong
/// to the factory and are removed on unmount, `Reuse*` containers belong to
/// whoever put them in the document and are only decorated.
#[derive(Clone, Default)]
pub enum RootTarget {
    /// Append a fresh `<div>` container to the document body.
    #[default]
    CreateNew,
    /// Reuse the first element matching a CSS selector.
    ReuseSelector(String),
    /// Reuse a caller-supplied element.
    ReuseElement(NodeRef),
}

/// Attributes and style declarations applied to the container at mount time
/// and reversed at unmount time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContainerOptions {
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub style: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct MountOptions {
    pub root: RootTarget,
    pub props: Props,
    pub container: ContainerOptions,
}

enum Ownership {
    Created,
    Borrowed,
}

struct MountState {
    instance: Uuid,
    component: Rc<dyn Component>,
    container: NodeRef,
    ownership: Ownership,
    container_options: ContainerOptions,
    props: RefCell<Props>,
    in_render: Cell<bool>,
    pending_unmount: Cell<bool>,
}

/// Unmount capability injected into every render, so a component can trigger
/// its own teardown (the banner does this when it finds the consent flag
/// already set).
///
/// Fired while a render is in progress, the teardown is deferred until the
/// factory has finished writing the fragment; fired afterwards it runs
/// immediately.
#[derive(Clone)]
pub struct UnmountTrigger {
    state: Rc<MountState>,
}

impl UnmountTrigger {
    pub fn trigger(&self) {
        if self.state.in_render.get() {
            self.state.pending_unmount.set(true);
        } else {
            teardown(&self.state);
        }
    }
}

/// Per-render context handed to [`Component::render`].
pub struct RenderContext {
    unmount: UnmountTrigger,
}

impl RenderContext {
    /// Request teardown of the mount this render belongs to.
    pub fn unmount(&self) {
        self.unmount.trigger();
    }

    /// A clonable handle to the same teardown, for host-side event plumbing.
    pub fn unmount_trigger(&self) -> UnmountTrigger {
        self.unmount.clone()
    }
}

/// Handle returned to the embedding page. Owned exclusively by the caller;
/// the factory keeps no reference to it after returning.
///
/// Dropping the handle does not unmount: the lifecycle ends with exactly one
/// explicit `unmount` call, and further calls are safe no-ops.
pub struct MountHandle {
    state: Rc<MountState>,
}

impl MountHandle {
    /// The element the component renders into.
    pub fn container(&self) -> NodeRef {
        self.state.container.clone()
    }

    /// Merge `partial` into the current props and re-render the whole
    /// fragment into the same container. Keys absent from `partial` keep the
    /// values accumulated by earlier calls.
    pub fn update(&self, partial: Props) -> Result<(), MountError> {
        {
            let mut props = self.state.props.borrow_mut();
            merge_props(&mut props, partial);
        }
        render_current(&self.state)
    }

    /// Clear the rendered component, then remove the container if the
    /// factory created it, or strip the applied container attributes and
    /// style properties if it was reused.
    pub fn unmount(&self) {
        teardown(&self.state);
    }
}

/// Shallow-merge `partial` into `current`, later keys winning.
pub fn merge_props(current: &mut Props, partial: Props) {
    for (key, value) in partial {
        current.insert(key, value);
    }
}

/// Wrap a component into a mount function suitable for registry
/// installation.
pub fn build_mount_fn(component: Rc<dyn Component>) -> MountFn {
    Rc::new(move |document, options| mount_component(document, component.clone(), options))
}

fn mount_component(
    document: &NodeRef,
    component: Rc<dyn Component>,
    options: MountOptions,
) -> Result<MountHandle, MountError> {
    let MountOptions {
        root,
        props,
        container: container_options,
    } = options;

    let (container, ownership) = match root {
        RootTarget::CreateNew => {
            let body = dom::document_body(document)
                .ok_or_else(|| MountError::Html("document has no <body> element".to_string()))?;
            let container = dom::create_element("div")
                .map_err(|_| MountError::Html("failed to create container element".to_string()))?;
            dom::apply_container(&container, &container_options);
            body.append(container.clone());
            (container, Ownership::Created)
        }
        RootTarget::ReuseSelector(selector) => {
            let element = dom::query_selector(document, &selector)
                .map_err(|_| MountError::Html(format!("query selector {selector:?} failed")))?
                .ok_or_else(|| MountError::RootNotFound(selector))?;
            dom::apply_container(&element, &container_options);
            (element, Ownership::Borrowed)
        }
        RootTarget::ReuseElement(element) => {
            dom::apply_container(&element, &container_options);
            (element, Ownership::Borrowed)
        }
    };

    let state = Rc::new(MountState {
        instance: Uuid::new_v4(),
        component,
        container,
        ownership,
        container_options,
        props: RefCell::new(props),
        in_render: Cell::new(false),
        pending_unmount: Cell::new(false),
    });
    debug!(
        instance = %state.instance,
        owned = matches!(state.ownership, Ownership::Created),
        "mounted widget"
    );
    render_current(&state)?;
    Ok(MountHandle { state })
}

fn render_current(state: &Rc<MountState>) -> Result<(), MountError> {
    let ctx = RenderContext {
        unmount: UnmountTrigger {
            state: state.clone(),
        },
    };
    state.in_render.set(true);
    let html = {
        let props = state.props.borrow();
        state.component.render(&props, &ctx)
    };
    state.in_render.set(false);

    dom::set_inner_html(&state.container, &html)
        .map_err(|_| MountError::Html("failed to parse rendered fragment".to_string()))?;

    if state.pending_unmount.take() {
        teardown(state);
    }
    Ok(())
}

fn teardown(state: &MountState) {
    dom::clear_children(&state.container);
    match state.ownership {
        Ownership::Created => state.container.detach(),
        Ownership::Borrowed => dom::remove_container(&state.container, &state.container_options),
    }
    debug!(instance = %state.instance, "unmounted widget");
}
