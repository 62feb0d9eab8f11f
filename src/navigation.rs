use crate::config::WatchConfig;
use crate::error::describe_js;
use crate::host;
use crate::scan::ScanCoordinator;
use crate::watcher::DomWatcher;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use web_sys::{MutationObserver, MutationObserverInit};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UrlTracker {
    last: String,
}

impl UrlTracker {
    pub fn new(url: impl Into<String>) -> Self {
        Self { last: url.into() }
    }

    /// Records `url` and reports whether it differs from the previous one.
    pub fn observe(&mut self, url: &str) -> bool {
        if self.last == url {
            return false;
        }
        self.last = url.to_string();
        true
    }

    pub fn last(&self) -> &str {
        &self.last
    }
}

/// Starts a new scan episode when `url` differs from the last one seen.
/// In-flight scans from the old page are discarded from then on.
pub fn begin_episode_if_moved(tracker: &RefCell<UrlTracker>, coordinator: &ScanCoordinator, url: &str) -> bool {
    if !tracker.borrow_mut().observe(url) {
        return false;
    }
    coordinator.reset_episode();
    true
}

/// Resets the episode and re-arms the watcher whenever the single-page app
/// changes its URL without a page load.
#[derive(Clone)]
pub struct NavigationMonitor {
    config: Rc<WatchConfig>,
    watcher: DomWatcher,
    coordinator: ScanCoordinator,
    tracker: Rc<RefCell<UrlTracker>>,
}

impl NavigationMonitor {
    pub fn new(config: Rc<WatchConfig>, watcher: DomWatcher, coordinator: ScanCoordinator) -> Self {
        let url = host::current_href().unwrap_or_default();
        Self {
            config,
            watcher,
            coordinator,
            tracker: Rc::new(RefCell::new(UrlTracker::new(url))),
        }
    }

    pub fn start(self) {
        let watcher = self.watcher.clone();
        host::set_timeout(self.config.initial_delay_ms, move || watcher.arm());

        let Some(window) = web_sys::window() else {
            return;
        };
        for event in ["hashchange", "popstate"] {
            let monitor = self.clone();
            let listener = Closure::<dyn FnMut(web_sys::Event)>::new(move |_: web_sys::Event| monitor.check());
            if let Err(err) = window.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref()) {
                warn!("cannot listen for {event}: {}", describe_js(&err));
            }
            listener.forget();
        }

        let Some(document) = window.document() else {
            return;
        };
        let monitor = self.clone();
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |_: js_sys::Array, _: MutationObserver| monitor.check(),
        );
        match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => {
                let options = MutationObserverInit::new();
                options.set_child_list(true);
                options.set_subtree(true);
                if let Err(err) = observer.observe_with_options(&document, &options) {
                    warn!("navigation observer not started: {}", describe_js(&err));
                }
            }
            Err(err) => warn!("navigation observer unavailable: {}", describe_js(&err)),
        }
        callback.forget();
    }

    fn check(&self) {
        let Some(url) = host::current_href() else {
            return;
        };
        if !begin_episode_if_moved(&self.tracker, &self.coordinator, &url) {
            return;
        }
        info!("navigated to {url}");
        let watcher = self.watcher.clone();
        host::set_timeout(self.config.settle_delay_ms, move || watcher.arm());
    }
}
