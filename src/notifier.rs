use crate::host;
use log::{debug, warn};
use serde::Serialize;
use wasm_bindgen_futures::spawn_local;

pub const VIP_DETECTED: &str = "vip-detected";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VipDetected<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(rename = "vipName")]
    pub vip_name: &'a str,
}

impl<'a> VipDetected<'a> {
    pub fn new(vip_name: &'a str) -> Self {
        Self {
            kind: VIP_DETECTED,
            vip_name,
        }
    }
}

/// Sends `vip-detected` to the background worker, which owns the system
/// notification. Delivery failures stop here.
#[derive(Clone, Copy, Debug, Default)]
pub struct Notifier;

impl Notifier {
    pub fn notify(&self, name: &str) {
        let message = match serde_wasm_bindgen::to_value(&VipDetected::new(name)) {
            Ok(message) => message,
            Err(err) => {
                warn!("notification for {name} not encoded: {err}");
                return;
            }
        };
        let name = name.to_string();
        spawn_local(async move {
            match host::send_message(message).await {
                Ok(_) => debug!("notification requested for {name}"),
                Err(err) => warn!("notification for {name} not delivered: {err}"),
            }
        });
    }
}
