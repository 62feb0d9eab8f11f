use std::fs;
use std::path::Path;

// Interfaces only reached through accessors never appear by name.
const REACHED_VIA: &[(&str, &str)] = &[
    ("Window", "web_sys::window()"),
    ("Location", ".location()"),
    ("DomTokenList", ".class_list()"),
    ("NodeList", ".query_selector_all("),
    ("Node", ".is_connected()"),
];

fn declared_features(manifest: &str) -> Vec<String> {
    let start = manifest.find("web-sys = {").unwrap();
    let list = &manifest[start..];
    let list = &list[list.find('[').unwrap() + 1..list.find(']').unwrap()];
    list.split(',')
        .map(|feature| feature.trim().trim_matches('"').to_string())
        .filter(|feature| !feature.is_empty())
        .collect()
}

fn sources() -> String {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let mut text = include_str!("dom.rs").to_string();
    for entry in fs::read_dir(root.join("src")).unwrap() {
        text.push_str(&fs::read_to_string(entry.unwrap().path()).unwrap());
    }
    text
}

fn names_type(source: &str, name: &str) -> bool {
    source.match_indices(name).any(|(at, _)| {
        let before = source[..at].chars().next_back();
        let after = source[at + name.len()..].chars().next();
        let boundary = |c: Option<char>| !c.is_some_and(|c| c.is_alphanumeric() || c == '_');
        boundary(before) && boundary(after)
    })
}

#[test]
fn every_web_sys_feature_is_used() {
    let features = declared_features(include_str!("../Cargo.toml"));
    assert!(features.contains(&"MutationObserver".to_string()));
    let source = sources();

    for feature in &features {
        let used = names_type(&source, feature)
            || REACHED_VIA
                .iter()
                .any(|(name, accessor)| name == feature && source.contains(accessor));
        assert!(used, "web-sys feature {feature} is declared but unused");
    }
}
