use crate::config;
use crate::error::Result;
use crate::host::{self, StorageArea};
use crate::remote_store::RemoteStore;
use crate::vip_list::VipList;
use log::{info, warn};

pub const VIPS_KEY: &str = "vips";

/// The VIP list as seen by this extension: always persisted in
/// `chrome.storage.sync`, optionally mirrored from a shared remote collection.
#[derive(Clone, Debug, Default)]
pub struct NameListStore {
    remote: Option<RemoteStore>,
}

impl NameListStore {
    pub fn local_only() -> Self {
        Self { remote: None }
    }

    pub fn with_remote(remote: RemoteStore) -> Self {
        Self {
            remote: Some(remote),
        }
    }

    pub async fn connect() -> Self {
        match config::load_backend_config().await {
            Ok(backend) => {
                info!("shared VIP store configured for project {}", backend.project_id);
                Self::with_remote(RemoteStore::new(backend))
            }
            Err(err) => {
                warn!("using local storage only: {err}");
                Self::local_only()
            }
        }
    }

    pub fn is_shared(&self) -> bool {
        self.remote.is_some()
    }

    pub async fn read(&self) -> Result<VipList> {
        Ok(host::read_key::<VipList>(StorageArea::Sync, VIPS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn write(&self, list: &VipList) -> Result<()> {
        host::write_key(StorageArea::Sync, VIPS_KEY, list).await
    }

    /// Mirrors the shared list into local storage. Falls back to the local
    /// list when the remote read fails or no remote is configured.
    pub async fn sync(&self) -> Result<VipList> {
        let Some(remote) = &self.remote else {
            return self.read().await;
        };
        match remote.list().await {
            Ok(list) => {
                self.write(&list).await?;
                Ok(list)
            }
            Err(err) => {
                warn!("shared VIP list unavailable, keeping local list: {err}");
                self.read().await
            }
        }
    }

    pub async fn add(&self, name: &str) -> Result<VipList> {
        match &self.remote {
            Some(remote) => {
                remote.add(name).await?;
                self.sync().await
            }
            None => {
                let mut list = self.read().await?;
                list.insert(name)?;
                self.write(&list).await?;
                Ok(list)
            }
        }
    }

    pub async fn remove(&self, name: &str) -> Result<VipList> {
        match &self.remote {
            Some(remote) => {
                remote.remove(name).await?;
                self.sync().await
            }
            None => {
                let mut list = self.read().await?;
                list.remove(name)?;
                self.write(&list).await?;
                Ok(list)
            }
        }
    }

    /// Pushes names that only exist locally to the shared collection.
    pub async fn migrate_local(&self) -> Result<usize> {
        let Some(remote) = &self.remote else {
            return Ok(0);
        };
        let local = self.read().await?;
        let pending = local.missing_from(&remote.list().await?);
        for name in &pending {
            remote.add(name).await?;
        }
        if !pending.is_empty() {
            info!("migrated {} local VIPs to the shared store", pending.len());
        }
        Ok(pending.len())
    }

    pub fn subscribe<F>(&self, mut on_change: F)
    where
        F: FnMut(VipList) + 'static,
    {
        host::on_key_changed(StorageArea::Sync, VIPS_KEY, move |value| {
            if value.is_undefined() || value.is_null() {
                on_change(VipList::default());
                return;
            }
            match serde_wasm_bindgen::from_value::<VipList>(value) {
                Ok(list) => on_change(list),
                Err(err) => warn!("ignoring malformed VIP list update: {err}"),
            }
        });
    }
}
