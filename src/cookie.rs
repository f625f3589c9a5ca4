use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::dom::escape_html;
use crate::factory::{Component, Props, RenderContext, build_mount_fn};
use crate::registry::{RegisterOptions, Registry, RegistryError};
use crate::session::SessionStore;

/// Namespace all widgets of this package register under.
pub const COMPONENTS_NAMESPACE: &str = "simpleComponents";

/// Widget name of the cookie banner under [`COMPONENTS_NAMESPACE`].
pub const COOKIE_WIDGET_NAME: &str = "Cookie";

const DEFAULT_TEXT: &str = "We use cookies for essential website functions and to better \
     understand how you use our site, so we can create the best possible experience for \
     you ❤️";

/// Props the embedding page passes to the banner, camelCase keys as in the
/// browser build. The consent flag key selects the entry in the session
/// store; without one the banner never shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieProps {
    pub session_storage_key: String,
    /// Banner copy. Raw HTML is allowed here, matching the browser build.
    pub text: String,
    pub link_href: String,
    pub link_text: String,
    pub button_text: String,
}

impl Default for CookieProps {
    fn default() -> Self {
        Self {
            session_storage_key: String::new(),
            text: DEFAULT_TEXT.to_string(),
            link_href: String::new(),
            link_text: "Privacy Policy".to_string(),
            button_text: "Got it".to_string(),
        }
    }
}

/// Cookie-consent banner.
///
/// Suppresses itself when the consent flag is already present in the session
/// store: the render still produces markup, and the injected unmount trigger
/// tears the mount down right after the initial write.
pub struct CookieBanner {
    store: Rc<dyn SessionStore>,
}

impl CookieBanner {
    pub fn new(store: Rc<dyn SessionStore>) -> Self {
        Self { store }
    }
}

impl Component for CookieBanner {
    fn render(&self, props: &Props, ctx: &RenderContext) -> String {
        let props = parse_props(props);

        let already_dismissed = props.session_storage_key.is_empty()
            || self
                .store
                .get(&props.session_storage_key)
                .is_some();
        if already_dismissed {
            ctx.unmount();
        }

        if !props.link_href.is_empty() && Url::parse(&props.link_href).is_err() {
            warn!(href = %props.link_href, "cookie banner link is not an absolute url");
        }

        format!(
            concat!(
                "<div class=\"simple-cookie\">",
                "<svg class=\"simple-cookie__icon\" viewBox=\"0 0 24 24\" aria-hidden=\"true\">",
                "<circle cx=\"12\" cy=\"12\" r=\"10\"></circle>",
                "<circle cx=\"9\" cy=\"9\" r=\"1.5\"></circle>",
                "<circle cx=\"15\" cy=\"10\" r=\"1.5\"></circle>",
                "<circle cx=\"11\" cy=\"15\" r=\"1.5\"></circle>",
                "</svg>",
                "<p class=\"simple-cookie__text\">{text}</p>",
                "<div class=\"simple-cookie__actions\">",
                "<a class=\"simple-cookie__link\" href=\"{href}\" target=\"_blank\" \
                 rel=\"noopener noreferrer\">{link_text}</a>",
                "<button class=\"simple-cookie__button\">{button_text}</button>",
                "</div>",
                "</div>"
            ),
            text = props.text,
            href = escape_html(&props.link_href),
            link_text = escape_html(&props.link_text),
            button_text = escape_html(&props.button_text),
        )
    }
}

/// Record the dismissal flag, the banner's click handler in the browser
/// build. The embedding page wires its own event plumbing to this and then
/// unmounts the handle (or simply remounts later and lets the banner
/// suppress itself).
pub fn dismiss(store: &dyn SessionStore, key: &str) {
    store.set(key, "true");
}

/// Install the banner's mount function at `simpleComponents.Cookie`.
pub fn register_cookie_banner(
    registry: &mut Registry,
    store: Rc<dyn SessionStore>,
) -> Result<(), RegistryError> {
    registry.register(
        COMPONENTS_NAMESPACE,
        COOKIE_WIDGET_NAME,
        build_mount_fn(Rc::new(CookieBanner::new(store))),
        RegisterOptions::default(),
    )?;
    Ok(())
}

fn parse_props(props: &Props) -> CookieProps {
    match serde_json::from_value(serde_json::Value::Object(props.clone())) {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(%err, "invalid cookie banner props; falling back to defaults");
            CookieProps::default()
        }
    }
}
