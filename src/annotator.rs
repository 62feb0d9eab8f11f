use crate::config::WatchConfig;
use crate::error::describe_js;
use leptos::mount::mount_to;
use leptos::prelude::*;
use log::{debug, warn};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

pub const BANNER_CLASS: &str = "vip-watch-banner";
pub const STYLE_ID: &str = "vip-watch-style";

const BANNER_CSS: &str = r#"
.vip-watch-banner {
  display: flex;
  align-items: center;
  justify-content: space-between;
  gap: 12px;
  margin-bottom: 10px;
  padding: 10px 14px;
  border-radius: 4px;
  background: #fce8b2;
  color: #d93025;
  font-weight: bold;
  animation: vip-watch-pulse 1.6s ease-in-out 3;
}
.vip-watch-banner__dismiss {
  border: none;
  background: transparent;
  color: inherit;
  font-size: 16px;
  cursor: pointer;
}
@keyframes vip-watch-pulse {
  0%, 100% { box-shadow: 0 0 0 0 rgba(217, 48, 37, 0.4); }
  50% { box-shadow: 0 0 0 6px rgba(217, 48, 37, 0); }
}
"#;

pub fn banner_text(name: &str) -> String {
    format!("\u{2b50} VIP DETECTED: {name} \u{2b50}")
}

pub fn has_banner(container: &Element) -> bool {
    container
        .query_selector(&format!(".{BANNER_CLASS}"))
        .ok()
        .flatten()
        .is_some()
}

/// Adds the shared banner stylesheet unless the document already has it.
pub fn ensure_stylesheet(document: &Document) -> bool {
    if document.get_element_by_id(STYLE_ID).is_some() {
        return false;
    }
    let Some(parent) = document
        .query_selector("head")
        .ok()
        .flatten()
        .or_else(|| document.document_element())
    else {
        return false;
    };
    let style = match document.create_element("style") {
        Ok(style) => style,
        Err(err) => {
            warn!("stylesheet not created: {}", describe_js(&err));
            return false;
        }
    };
    style.set_id(STYLE_ID);
    style.set_text_content(Some(BANNER_CSS));
    parent.append_child(&style).is_ok()
}

#[derive(Clone, Debug)]
pub struct Annotator {
    config: Rc<WatchConfig>,
}

impl Annotator {
    pub fn new(config: Rc<WatchConfig>) -> Self {
        Self { config }
    }

    pub fn container_for(&self, fragment: &Element) -> Element {
        fragment
            .closest(&self.config.container_selector)
            .ok()
            .flatten()
            .unwrap_or_else(|| fragment.clone())
    }

    pub fn is_claimed(&self, fragment: &Element) -> bool {
        has_banner(&self.container_for(fragment))
    }

    /// Inserts a dismissible banner as the first child of the fragment's
    /// message container. Returns false when the container already had one.
    pub fn annotate(&self, fragment: &Element, name: &str) -> bool {
        let container = self.container_for(fragment);
        if has_banner(&container) {
            debug!("banner already present for {name}");
            return false;
        }
        let Some(document) = container.owner_document() else {
            return false;
        };
        ensure_stylesheet(&document);

        let host = match document
            .create_element("div")
            .and_then(|el| el.dyn_into::<HtmlElement>().map_err(Into::into))
        {
            Ok(host) => host,
            Err(err) => {
                warn!("banner not created: {}", describe_js(&err));
                return false;
            }
        };
        host.set_class_name(BANNER_CLASS);
        let _ = host.set_attribute("role", "status");
        if let Err(err) = container.insert_before(&host, container.first_child().as_ref()) {
            warn!("banner not inserted: {}", describe_js(&err));
            return false;
        }

        let label = banner_text(name);
        let dismiss_target = host.clone();
        mount_to(host, move || {
            view! {
                <span class="vip-watch-banner__label">{label}</span>
                <button
                    class="vip-watch-banner__dismiss"
                    title="Dismiss"
                    on:click=move |_| dismiss_target.remove()
                >
                    "\u{d7}"
                </button>
            }
        })
        .forget();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_names_the_vip() {
        assert_eq!(banner_text("Grace Hopper"), "\u{2b50} VIP DETECTED: Grace Hopper \u{2b50}");
    }

    #[test]
    fn stylesheet_targets_banner_class() {
        assert!(BANNER_CSS.contains(&format!(".{BANNER_CLASS}")));
    }
}
