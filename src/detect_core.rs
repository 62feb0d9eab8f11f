use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

pub const KEY_PREFIX_CHARS: usize = 80;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Header,
    Content,
}

/// Heuristic identity of a rendered fragment: normalized text prefix plus the
/// element's class list. Two distinct nodes with the same prefix and class
/// collide, which is accepted.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FragmentKey {
    pub prefix: String,
    pub class: String,
}

impl FragmentKey {
    pub fn derive(text: &str, class: &str) -> Self {
        Self {
            prefix: normalize_text(text).chars().take(KEY_PREFIX_CHARS).collect(),
            class: class.split_whitespace().collect::<Vec<_>>().join(" "),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FragmentText {
    pub key: FragmentKey,
    pub text: String,
    /// The enclosing message already carries a banner.
    pub claimed: bool,
}

impl FragmentText {
    pub fn new(text: impl Into<String>, class: &str) -> Self {
        let text = text.into();
        Self {
            key: FragmentKey::derive(&text, class),
            text,
            claimed: false,
        }
    }

    pub fn claimed(mut self, claimed: bool) -> Self {
        self.claimed = claimed;
        self
    }
}

pub fn normalize_text(text: &str) -> String {
    static RE_SPACE: OnceLock<Regex> = OnceLock::new();
    let re_space = RE_SPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"));
    re_space.replace_all(text.trim(), " ").to_lowercase()
}

#[derive(Clone, Debug, Default)]
pub struct MatchIndex {
    entries: Vec<(String, String)>,
}

impl MatchIndex {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        let mut seen = HashSet::new();
        let entries = names
            .iter()
            .map(|name| name.as_ref())
            .filter(|name| seen.insert(name.to_string()))
            .filter_map(|name| {
                let needle = normalize_text(name);
                (!needle.is_empty()).then(|| (name.to_string(), needle))
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn matches(&self, text: &str) -> Vec<String> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let haystack = normalize_text(text);
        self.entries
            .iter()
            .filter(|(_, needle)| haystack.contains(needle.as_str()))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub fn matches<S: AsRef<str>>(text: &str, names: &[S]) -> Vec<String> {
    if names.is_empty() {
        return Vec::new();
    }
    MatchIndex::new(names).matches(text)
}

#[derive(Debug, Default)]
pub struct SeenRegistry {
    seen: HashSet<FragmentKey>,
    episode: u64,
}

impl SeenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_process(&mut self, key: &FragmentKey) -> bool {
        !self.seen.contains(key) && self.seen.insert(key.clone())
    }

    pub fn contains(&self, key: &FragmentKey) -> bool {
        self.seen.contains(key)
    }

    pub fn reset(&mut self) {
        self.seen.clear();
        self.episode += 1;
    }

    pub fn episode(&self) -> u64 {
        self.episode
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub name: String,
    pub key: FragmentKey,
    pub kind: FragmentKind,
    pub index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanPlan {
    pub hits: Vec<MatchResult>,
    pub header_matched: bool,
    pub evaluated: usize,
    pub skipped: usize,
}

impl ScanPlan {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

pub fn plan_batch<S: AsRef<str>>(
    names: &[S],
    headers: &[FragmentText],
    contents: &[FragmentText],
    registry: &mut SeenRegistry,
) -> ScanPlan {
    let mut plan = ScanPlan::default();
    let index = MatchIndex::new(names);
    if index.is_empty() {
        return plan;
    }

    evaluate(&index, FragmentKind::Header, headers, registry, &mut plan);
    plan.header_matched = !plan.hits.is_empty();
    if !plan.header_matched {
        evaluate(&index, FragmentKind::Content, contents, registry, &mut plan);
    }
    plan
}

fn evaluate(
    index: &MatchIndex,
    kind: FragmentKind,
    fragments: &[FragmentText],
    registry: &mut SeenRegistry,
    plan: &mut ScanPlan,
) {
    for (position, fragment) in fragments.iter().enumerate() {
        if !registry.should_process(&fragment.key) {
            plan.skipped += 1;
            continue;
        }
        if fragment.claimed {
            plan.skipped += 1;
            continue;
        }
        plan.evaluated += 1;
        for name in index.matches(&fragment.text) {
            plan.hits.push(MatchResult {
                name,
                key: fragment.key.clone(),
                kind,
                index: position,
            });
        }
    }
}
