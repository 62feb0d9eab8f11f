use crate::annotator::Annotator;
use crate::config::WatchConfig;
use crate::detect_core::{FragmentKind, FragmentText};
use wasm_bindgen::JsCast;
use web_sys::Element;

/// Fragments read from the live DOM for one batch. Elements are only valid
/// for the turn that gathered them.
#[derive(Clone, Debug, Default)]
pub struct FragmentBatch {
    pub headers: Vec<(Element, FragmentText)>,
    pub contents: Vec<(Element, FragmentText)>,
}

impl FragmentBatch {
    pub fn header_texts(&self) -> Vec<FragmentText> {
        self.headers.iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn content_texts(&self) -> Vec<FragmentText> {
        self.contents.iter().map(|(_, text)| text.clone()).collect()
    }

    pub fn element(&self, kind: FragmentKind, index: usize) -> Option<&Element> {
        let fragments = match kind {
            FragmentKind::Header => &self.headers,
            FragmentKind::Content => &self.contents,
        };
        fragments.get(index).map(|(element, _)| element)
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty() && self.contents.is_empty()
    }
}

/// Reads the fragments below `root`; matches outside the observed subtree are
/// ignored.
pub fn gather(root: &Element, config: &WatchConfig, annotator: &Annotator) -> FragmentBatch {
    FragmentBatch {
        headers: select(root, &config.header_selector)
            .into_iter()
            .map(|element| {
                let text = header_text(&element, &config.sender_attribute);
                let fragment = FragmentText::new(text, &element.class_name())
                    .claimed(annotator.is_claimed(&element));
                (element, fragment)
            })
            .collect(),
        contents: select(root, &config.content_selector)
            .into_iter()
            .map(|element| {
                let text = element.text_content().unwrap_or_default();
                let fragment = FragmentText::new(text, &element.class_name())
                    .claimed(annotator.is_claimed(&element));
                (element, fragment)
            })
            .collect(),
    }
}

fn header_text(element: &Element, sender_attribute: &str) -> String {
    let display = element.text_content().unwrap_or_default();
    match element.get_attribute(sender_attribute) {
        Some(address) if !address.is_empty() && !display.contains(&address) => {
            format!("{} <{address}>", display.trim())
        }
        _ => display,
    }
}

fn select(root: &Element, selector: &str) -> Vec<Element> {
    let Ok(nodes) = root.query_selector_all(selector) else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}
