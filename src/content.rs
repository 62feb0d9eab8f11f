use crate::annotator::Annotator;
use crate::config;
use crate::host;
use crate::name_store::NameListStore;
use crate::navigation::NavigationMonitor;
use crate::notifier::Notifier;
use crate::scan::ScanCoordinator;
use crate::watcher::DomWatcher;
use log::{debug, info, warn};
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

/// Wires the detection pipeline into the current page.
pub fn boot() {
    spawn_local(async {
        let config = Rc::new(config::load_watch_config().await);
        let hostname = host::current_hostname().unwrap_or_default();
        if !config.matches_host(&hostname) {
            debug!("VIP watch idle on {hostname}");
            return;
        }
        info!("VIP watch activated on {hostname}");

        let store = NameListStore::connect().await;
        if store.is_shared() {
            let store = store.clone();
            spawn_local(async move {
                if let Err(err) = store.migrate_local().await {
                    warn!("local VIPs not migrated: {err}");
                }
                if let Ok(list) = store.sync().await {
                    info!("{} VIPs after sync", list.len());
                }
            });
        }

        let coordinator = ScanCoordinator::new(
            config.clone(),
            store.clone(),
            Annotator::new(config.clone()),
            Notifier,
        );
        let watcher = DomWatcher::new(config.clone(), coordinator.clone());

        let rescan = watcher.clone();
        store.subscribe(move |list| {
            info!("VIP list changed, now {} names", list.len());
            rescan.rescan();
        });

        NavigationMonitor::new(config, watcher, coordinator).start();
    });
}
