use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

pub const NOTIFICATION_TITLE: &str = "VIP Email Detected!";
pub const NOTIFICATION_ICON: &str = "images/icon128.png";
pub const NOTIFICATION_PRIORITY: u8 = 2;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "notifications"], js_name = create, catch)]
    async fn create_notification(options: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum IncomingMessage {
    #[serde(rename = "vip-detected")]
    VipDetected {
        #[serde(rename = "vipName")]
        vip_name: String,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationOptions {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub icon_url: String,
    pub title: String,
    pub message: String,
    pub priority: u8,
}

impl NotificationOptions {
    pub fn basic(title: &str, body: &str, icon: &str, priority: u8) -> Self {
        Self {
            kind: "basic",
            icon_url: icon.to_string(),
            title: title.to_string(),
            message: body.to_string(),
            priority,
        }
    }

    pub fn for_vip(vip_name: &str) -> Self {
        Self::basic(
            NOTIFICATION_TITLE,
            &format!("An email containing VIP \"{vip_name}\" has been detected."),
            NOTIFICATION_ICON,
            NOTIFICATION_PRIORITY,
        )
    }
}

/// Fire-and-forget system notification.
pub fn raise(options: NotificationOptions) {
    let payload = match serde_wasm_bindgen::to_value(&options) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("notification options not encoded: {err}");
            return;
        }
    };
    spawn_local(async move {
        if let Err(err) = create_notification(payload).await {
            warn!("notification not shown: {err:?}");
        }
    });
}

impl IncomingMessage {
    pub fn notification(&self) -> Option<NotificationOptions> {
        match self {
            IncomingMessage::VipDetected { vip_name } => Some(NotificationOptions::for_vip(vip_name)),
            IncomingMessage::Unknown => None,
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// The worker registers its chrome listeners synchronously in the loader and
// forwards events here once the module is instantiated.

#[wasm_bindgen]
pub fn handle_message(message: JsValue) {
    match serde_wasm_bindgen::from_value::<IncomingMessage>(message) {
        Ok(message) => match message.notification() {
            Some(options) => {
                info!("VIP detected, raising \"{}\"", options.message);
                raise(options);
            }
            None => debug!("ignoring unrelated message"),
        },
        Err(err) => debug!("ignoring malformed message: {err}"),
    }
}

#[wasm_bindgen]
pub fn handle_installed() {
    info!("VIP Email Notifier installed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    #[test]
    fn parses_vip_detected_message() {
        let message: IncomingMessage =
            serde_json::from_value(json!({ "type": "vip-detected", "vipName": "Grace Hopper" })).unwrap();
        assert_eq!(
            message,
            IncomingMessage::VipDetected {
                vip_name: "Grace Hopper".into()
            }
        );
    }

    #[test]
    fn other_message_types_are_unknown() {
        let message: IncomingMessage = serde_json::from_value(json!({ "type": "ping" })).unwrap();
        assert_eq!(message, IncomingMessage::Unknown);
    }

    #[test]
    fn only_vip_messages_raise_notifications() {
        let detected = IncomingMessage::VipDetected {
            vip_name: "Grace Hopper".into(),
        };
        assert_eq!(
            detected.notification(),
            Some(NotificationOptions::for_vip("Grace Hopper"))
        );
        assert_eq!(IncomingMessage::Unknown.notification(), None);
    }

    #[test]
    fn loader_registers_listeners_before_instantiating() {
        let loader = include_str!("../../extension/background-loader.js");
        let listener = loader
            .find("chrome.runtime.onMessage.addListener")
            .unwrap();
        let init = loader.find("init()").unwrap();
        assert!(listener < init);
        assert!(loader.contains("handle_message"));
        assert!(loader.contains("chrome.runtime.onInstalled.addListener"));
    }

    #[test]
    fn notification_icon_ships_with_extension() {
        let extension = Path::new(env!("CARGO_MANIFEST_DIR")).join("../extension");
        assert!(extension.join(NOTIFICATION_ICON).is_file());

        let manifest: serde_json::Value =
            serde_json::from_str(include_str!("../../extension/manifest.json")).unwrap();
        let icons = manifest["icons"].as_object().unwrap();
        for icon in icons.values() {
            assert!(extension.join(icon.as_str().unwrap()).is_file());
        }
    }

    #[test]
    fn notification_names_the_vip() {
        let options = NotificationOptions::for_vip("Ada");
        let value = serde_json::to_value(&options).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "basic",
                "iconUrl": "images/icon128.png",
                "title": "VIP Email Detected!",
                "message": "An email containing VIP \"Ada\" has been detected.",
                "priority": 2
            })
        );
    }
}
