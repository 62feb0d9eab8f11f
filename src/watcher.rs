use crate::config::WatchConfig;
use crate::error::describe_js;
use crate::host;
use crate::scan::ScanCoordinator;
use log::{debug, info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{Element, MutationObserver, MutationObserverInit};

type MutationCallback = Closure<dyn FnMut(js_sys::Array, MutationObserver)>;

struct Armed {
    root: Element,
    observer: MutationObserver,
    _callback: MutationCallback,
}

struct WatcherInner {
    config: Rc<WatchConfig>,
    coordinator: ScanCoordinator,
    armed: RefCell<Option<Armed>>,
}

#[derive(Clone)]
pub struct DomWatcher {
    inner: Rc<WatcherInner>,
}

impl DomWatcher {
    pub fn new(config: Rc<WatchConfig>, coordinator: ScanCoordinator) -> Self {
        Self {
            inner: Rc::new(WatcherInner {
                config,
                coordinator,
                armed: RefCell::new(None),
            }),
        }
    }

    /// Starts (or restarts) observing the mailbox and scans what is already
    /// rendered. Does nothing outside the configured host.
    pub fn arm(&self) {
        let hostname = host::current_hostname().unwrap_or_default();
        if !self.inner.config.matches_host(&hostname) {
            debug!("not arming on {hostname}");
            return;
        }
        let Some(root) = self.observed_root() else {
            warn!("no element to observe yet");
            return;
        };

        self.disarm();
        let coordinator = self.inner.coordinator.clone();
        let scanned = root.clone();
        let callback: MutationCallback = Closure::new(move |records: js_sys::Array, _: MutationObserver| {
            coordinator.schedule_scan(scanned.clone(), records.length() as usize);
        });
        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(err) => {
                warn!("mutation observer unavailable: {}", describe_js(&err));
                return;
            }
        };
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        if let Err(err) = observer.observe_with_options(&root, &options) {
            warn!("observation not started: {}", describe_js(&err));
            return;
        }

        info!("watching <{}> for VIP messages", root.tag_name().to_lowercase());
        self.inner.coordinator.schedule_scan(root.clone(), 0);
        *self.inner.armed.borrow_mut() = Some(Armed {
            root,
            observer,
            _callback: callback,
        });
    }

    /// Rescans the currently observed subtree, e.g. after the list changed.
    pub fn rescan(&self) {
        let root = self.inner.armed.borrow().as_ref().map(|armed| armed.root.clone());
        match root {
            Some(root) => self.inner.coordinator.schedule_scan(root, 0),
            None => debug!("not armed, nothing to rescan"),
        }
    }

    pub fn disarm(&self) {
        if let Some(armed) = self.inner.armed.borrow_mut().take() {
            armed.observer.disconnect();
        }
    }

    fn observed_root(&self) -> Option<Element> {
        let document = web_sys::window()?.document()?;
        document
            .query_selector(&self.inner.config.root_selector)
            .ok()
            .flatten()
            .or_else(|| document.body().map(Element::from))
    }
}
