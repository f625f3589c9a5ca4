use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::factory::{ContainerOptions, MountOptions, RootTarget};

/// Host configuration for the demo binary: which page to load and which
/// registered widgets to mount into it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostConfig {
    pub page: PathBuf,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub widgets: Vec<WidgetMount>,
}

/// One mount call: the dotted entry point installed on the registry plus the
/// options forwarded to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetMount {
    /// Dotted path of the mount function, e.g. `simpleComponents.Cookie`.
    pub entry: String,
    /// CSS selector of the element to reuse; absent means a fresh container
    /// appended to the body.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub props: serde_json::Value,
    #[serde(default)]
    pub container: ContainerOptions,
}

impl WidgetMount {
    pub fn to_mount_options(&self) -> MountOptions {
        let root = match &self.root {
            Some(selector) => RootTarget::ReuseSelector(selector.clone()),
            None => RootTarget::CreateNew,
        };
        let props = match &self.props {
            serde_json::Value::Object(map) => map.clone(),
            serde_json::Value::Null => Default::default(),
            other => {
                warn!(entry = %self.entry, props = %other, "widget props must be an object; ignoring");
                Default::default()
            }
        };
        MountOptions {
            root,
            props,
            container: self.container.clone(),
        }
    }
}

impl HostConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let page = PathBuf::from(
            std::env::var("WIDGET_PAGE").unwrap_or_else(|_| "index.html".to_string()),
        );
        let output = std::env::var("WIDGET_OUTPUT").ok().map(PathBuf::from);
        let widgets = match std::env::var("WIDGET_MOUNTS_JSON") {
            Ok(raw) => serde_json::from_str(&raw).context("failed to parse WIDGET_MOUNTS_JSON")?,
            Err(_) => Vec::new(),
        };
        Ok(Self {
            page,
            output,
            widgets,
        })
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {:?}", path))?;
        let config = toml::from_str(&raw).with_context(|| format!("parsing config {:?}", path))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_toml_config() {
        let config: HostConfig = toml::from_str(
            r##"
            page = "index.html"
            output = "out.html"

            [[widgets]]
            entry = "simpleComponents.Cookie"
            root = "#cookie-slot"
            props = { sessionStorageKey = "cookie-consent", buttonText = "OK" }

            [widgets.container]
            attributes = { "data-widget" = "cookie" }
            style = { position = "fixed", bottom = "0" }
            "##,
        )
        .unwrap();

        assert_eq!(config.page, PathBuf::from("index.html"));
        assert_eq!(config.widgets.len(), 1);

        let widget = &config.widgets[0];
        assert_eq!(widget.entry, "simpleComponents.Cookie");
        assert_eq!(widget.root.as_deref(), Some("#cookie-slot"));
        assert_eq!(widget.props["buttonText"], json!("OK"));
        assert_eq!(widget.container.style["position"], "fixed");
    }

    #[test]
    fn mount_options_reflect_root_presence() {
        let widget = WidgetMount {
            entry: "ns.Widget".to_string(),
            root: None,
            props: json!({"a": 1}),
            container: ContainerOptions::default(),
        };
        let options = widget.to_mount_options();
        assert!(matches!(options.root, RootTarget::CreateNew));
        assert_eq!(options.props["a"], json!(1));

        let widget = WidgetMount {
            root: Some("#host".to_string()),
            ..widget
        };
        assert!(matches!(
            widget.to_mount_options().root,
            RootTarget::ReuseSelector(selector) if selector == "#host"
        ));
    }

    #[test]
    fn non_object_props_are_ignored() {
        let widget = WidgetMount {
            entry: "ns.Widget".to_string(),
            root: None,
            props: json!([1, 2, 3]),
            container: ContainerOptions::default(),
        };
        assert!(widget.to_mount_options().props.is_empty());
    }
}
