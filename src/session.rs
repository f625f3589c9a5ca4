use std::cell::RefCell;
use std::collections::BTreeMap;

/// Key-value flag storage the banner uses to suppress itself after
/// dismissal. The browser build backs this with `sessionStorage`; embedders
/// supply whatever store matches their host environment.
///
/// The mount factory never touches this; only components do.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Process-local store, the default for hosts and tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_overwrites_flags() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get("cookie-consent"), None);

        store.set("cookie-consent", "true");
        assert_eq!(store.get("cookie-consent").as_deref(), Some("true"));

        store.set("cookie-consent", "false");
        assert_eq!(store.get("cookie-consent").as_deref(), Some("false"));
    }
}
