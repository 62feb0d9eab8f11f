#![cfg(target_arch = "wasm32")]

use std::rc::Rc;
use vip_watch::annotator::{ensure_stylesheet, has_banner, Annotator, BANNER_CLASS, STYLE_ID};
use vip_watch::config::WatchConfig;
use vip_watch::detect_core::{plan_batch, FragmentKind, SeenRegistry};
use vip_watch::fragments;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount_fixture(html: &str) -> Element {
    let document = document();
    let root = document.create_element("div").unwrap();
    root.set_inner_html(html);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn annotator() -> Annotator {
    Annotator::new(Rc::new(WatchConfig::default()))
}

fn banners(root: &Element) -> u32 {
    root.query_selector_all(&format!(".{BANNER_CLASS}")).unwrap().length()
}

#[wasm_bindgen_test]
fn annotating_twice_leaves_one_banner() {
    let root = mount_fixture(r#"<div class="adn"><div class="a3s aiL">Email from Grace Hopper</div></div>"#);
    let body = root.query_selector(".a3s").unwrap().unwrap();

    assert!(annotator().annotate(&body, "Grace Hopper"));
    assert!(!annotator().annotate(&body, "Grace Hopper"));
    assert!(!annotator().annotate(&body, "Ada"));
    assert_eq!(banners(&root), 1);

    let container = root.query_selector(".adn").unwrap().unwrap();
    let first = container.first_element_child().unwrap();
    assert!(first.class_list().contains(BANNER_CLASS));
    assert!(first.text_content().unwrap().contains("Grace Hopper"));
    root.remove();
}

#[wasm_bindgen_test]
fn falls_back_to_fragment_without_container() {
    let root = mount_fixture(r#"<div class="a3s aiL">Ada says hi</div>"#);
    let body = root.query_selector(".a3s").unwrap().unwrap();

    assert!(annotator().annotate(&body, "Ada"));
    assert!(has_banner(&body));
    root.remove();
}

#[wasm_bindgen_test]
fn dismiss_removes_banner() {
    let root = mount_fixture(r#"<div class="adn"><div class="a3s aiL">Ada</div></div>"#);
    let body = root.query_selector(".a3s").unwrap().unwrap();
    annotator().annotate(&body, "Ada");

    let button = root
        .query_selector(".vip-watch-banner__dismiss")
        .unwrap()
        .unwrap()
        .dyn_into::<HtmlElement>()
        .unwrap();
    button.click();
    assert_eq!(banners(&root), 0);
    root.remove();
}

#[wasm_bindgen_test]
fn stylesheet_installed_once() {
    let document = document();
    ensure_stylesheet(&document);
    assert!(!ensure_stylesheet(&document));
    assert_eq!(
        document.query_selector_all(&format!("#{STYLE_ID}")).unwrap().length(),
        1
    );
}

#[wasm_bindgen_test]
fn header_match_annotates_once_and_skips_body() {
    let root = mount_fixture(
        r#"<div class="adn">
             <span class="gD" email="g@x.com">Grace Hopper</span>
             <div class="a3s aiL">Regards, Grace Hopper</div>
           </div>"#,
    );
    let config = WatchConfig::default();
    let annotator = annotator();
    let mut registry = SeenRegistry::new();

    let batch = fragments::gather(&root, &config, &annotator);
    assert_eq!(batch.headers[0].1.text, "Grace Hopper <g@x.com>");
    let plan = plan_batch(&["Grace Hopper"], &batch.header_texts(), &batch.content_texts(), &mut registry);
    assert_eq!(plan.hits.len(), 1);
    assert_eq!(plan.hits[0].kind, FragmentKind::Header);
    for hit in &plan.hits {
        annotator.annotate(batch.element(hit.kind, hit.index).unwrap(), &hit.name);
    }

    let batch = fragments::gather(&root, &config, &annotator);
    assert!(batch.contents[0].1.claimed);
    let plan = plan_batch(&["Grace Hopper"], &batch.header_texts(), &batch.content_texts(), &mut registry);
    assert!(plan.is_empty());
    assert_eq!(banners(&root), 1);
    root.remove();
}

#[wasm_bindgen_test]
fn gather_ignores_fragments_outside_root() {
    let outside = mount_fixture(r#"<div class="a3s aiL">Compose draft to Grace Hopper</div>"#);
    let root = mount_fixture(r#"<div class="adn"><div class="a3s aiL">Hello from Ada</div></div>"#);
    let config = WatchConfig::default();
    let annotator = annotator();

    let batch = fragments::gather(&root, &config, &annotator);
    assert_eq!(batch.contents.len(), 1);
    assert!(batch.contents[0].1.text.contains("Ada"));

    let mut registry = SeenRegistry::new();
    let plan = plan_batch(&["Grace Hopper"], &batch.header_texts(), &batch.content_texts(), &mut registry);
    assert!(plan.is_empty());
    assert_eq!(banners(&outside), 0);
    outside.remove();
    root.remove();
}
