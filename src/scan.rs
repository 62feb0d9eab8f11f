use crate::annotator::Annotator;
use crate::config::WatchConfig;
use crate::detect_core::{plan_batch, ScanPlan, SeenRegistry};
use crate::fragments::{self, FragmentBatch};
use crate::name_store::NameListStore;
use crate::notifier::Notifier;
use crate::vip_list::VipList;
use log::{debug, warn};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use web_sys::Element;

/// Whether a scan that captured `episode` before awaiting the list may still
/// touch the page. An empty list or an intervening navigation ends it.
pub fn resume_allowed(episode: u64, registry: &SeenRegistry, names: &VipList) -> bool {
    !names.is_empty() && registry.episode() == episode
}

/// Turns mutation batches into annotations and notifications. Cloning shares
/// the same registry, so every clone belongs to the same episode.
#[derive(Clone, Debug)]
pub struct ScanCoordinator {
    config: Rc<WatchConfig>,
    registry: Rc<RefCell<SeenRegistry>>,
    store: NameListStore,
    annotator: Annotator,
    notifier: Notifier,
}

impl ScanCoordinator {
    pub fn new(
        config: Rc<WatchConfig>,
        store: NameListStore,
        annotator: Annotator,
        notifier: Notifier,
    ) -> Self {
        Self {
            config,
            registry: Rc::new(RefCell::new(SeenRegistry::new())),
            store,
            annotator,
            notifier,
        }
    }

    pub fn reset_episode(&self) {
        let mut registry = self.registry.borrow_mut();
        let forgotten = registry.len();
        registry.reset();
        debug!("episode {} started, forgot {forgotten} fragments", registry.episode());
    }

    pub fn episode(&self) -> u64 {
        self.registry.borrow().episode()
    }

    pub fn may_resume(&self, episode: u64, names: &VipList) -> bool {
        resume_allowed(episode, &self.registry.borrow(), names)
    }

    /// Scans the subtree under `root` once the current VIP list is known.
    pub fn schedule_scan(&self, root: Element, mutations: usize) {
        let coordinator = self.clone();
        spawn_local(async move { coordinator.scan(&root, mutations).await });
    }

    async fn scan(&self, root: &Element, mutations: usize) {
        let episode = self.episode();
        let names = match self.store.read().await {
            Ok(names) => names,
            Err(err) => {
                warn!("VIP list unavailable, skipping batch: {err}");
                return;
            }
        };
        if !self.may_resume(episode, &names) {
            debug!("dropping scan from episode {episode}");
            return;
        }
        if !root.is_connected() {
            debug!("observed root detached, skipping batch");
            return;
        }

        let batch = fragments::gather(root, &self.config, &self.annotator);
        if batch.is_empty() {
            return;
        }
        let plan = plan_batch(
            names.names(),
            &batch.header_texts(),
            &batch.content_texts(),
            &mut self.registry.borrow_mut(),
        );
        debug!(
            "batch of {mutations} mutations: {} evaluated, {} skipped, {} hits",
            plan.evaluated,
            plan.skipped,
            plan.hits.len()
        );
        self.apply(&batch, &plan);
    }

    fn apply(&self, batch: &FragmentBatch, plan: &ScanPlan) {
        for hit in &plan.hits {
            if let Some(element) = batch.element(hit.kind, hit.index) {
                self.annotator.annotate(element, &hit.name);
            }
            self.notifier.notify(&hit.name);
        }
    }
}
