//! REST client for the shared VIP collection kept in a Firestore database.
//!
//! Each VIP is a document holding one `name` string plus creation and update
//! timestamps. Duplicate checks happen client-side before writing.

use crate::config::BackendConfig;
use crate::error::{ListError, Result, VipError};
use crate::vip_list::VipList;
use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

#[derive(Clone, Debug, Default, Deserialize)]
struct ListResponse {
    #[serde(default)]
    documents: Vec<NameDocument>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NameDocument {
    pub name: String,
    #[serde(default)]
    fields: NameFields,
}

#[derive(Clone, Debug, Default, Deserialize)]
struct NameFields {
    #[serde(default)]
    name: Option<StringValue>,
}

#[derive(Clone, Debug, Deserialize)]
struct StringValue {
    #[serde(rename = "stringValue")]
    string_value: Option<String>,
}

impl NameDocument {
    pub fn vip_name(&self) -> Option<&str> {
        self.fields
            .name
            .as_ref()
            .and_then(|value| value.string_value.as_deref())
            .filter(|name| !name.is_empty())
    }

    pub fn doc_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }
}

pub fn parse_documents(body: &str) -> Result<Vec<NameDocument>> {
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let response: ListResponse = serde_json::from_str(body)?;
    Ok(response.documents)
}

pub fn names_from_documents(documents: &[NameDocument]) -> VipList {
    VipList::from_names(documents.iter().filter_map(NameDocument::vip_name))
}

pub fn new_document_body(name: &str, now: DateTime<Utc>) -> serde_json::Value {
    let stamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
    json!({
        "fields": {
            "name": { "stringValue": name },
            "createdAt": { "timestampValue": stamp },
            "updatedAt": { "timestampValue": stamp },
        }
    })
}

#[derive(Clone, Debug)]
pub struct RemoteStore {
    config: BackendConfig,
}

impl RemoteStore {
    pub fn new(config: BackendConfig) -> Self {
        Self { config }
    }

    pub fn collection_url(&self) -> String {
        format!(
            "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents/{}?key={}",
            self.config.project_id, self.config.collection, self.config.api_key
        )
    }

    pub fn document_url(&self, doc_id: &str) -> String {
        format!(
            "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents/{}/{}?key={}",
            self.config.project_id, self.config.collection, doc_id, self.config.api_key
        )
    }

    pub async fn list_documents(&self) -> Result<Vec<NameDocument>> {
        let (status, body) = send("GET", &self.collection_url(), None).await?;
        match status {
            200..=299 => parse_documents(&body),
            404 => {
                debug!("shared collection {} does not exist yet", self.config.collection);
                Ok(Vec::new())
            }
            _ => Err(VipError::Http { status, body }),
        }
    }

    pub async fn list(&self) -> Result<VipList> {
        Ok(names_from_documents(&self.list_documents().await?))
    }

    pub async fn add(&self, name: &str) -> Result<String> {
        let mut existing = self.list().await?;
        let name = existing.insert(name)?;
        let body = new_document_body(&name, Utc::now()).to_string();
        let (status, text) = send("POST", &self.collection_url(), Some(body)).await?;
        if !(200..300).contains(&status) {
            return Err(VipError::Http { status, body: text });
        }
        info!("added {name} to shared collection");
        Ok(name)
    }

    pub async fn remove(&self, name: &str) -> Result<usize> {
        let name = name.trim();
        let targets: Vec<_> = self
            .list_documents()
            .await?
            .into_iter()
            .filter(|doc| doc.vip_name() == Some(name))
            .collect();
        if targets.is_empty() {
            return Err(ListError::Missing(name.to_string()).into());
        }
        for doc in &targets {
            let (status, body) = send("DELETE", &self.document_url(doc.doc_id()), None).await?;
            if !(200..300).contains(&status) {
                return Err(VipError::Http { status, body });
            }
        }
        info!("removed {name} from shared collection ({} documents)", targets.len());
        Ok(targets.len())
    }
}

async fn send(method: &str, url: &str, body: Option<String>) -> Result<(u16, String)> {
    let init = RequestInit::new();
    init.set_method(method);
    if let Some(body) = body {
        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));
    }
    let request = Request::new_with_str_and_init(url, &init)?;
    let window = web_sys::window().ok_or_else(|| VipError::Js("no window to fetch from".to_string()))?;
    let response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into::<Response>()?;
    let text = JsFuture::from(response.text()?).await?.as_string().unwrap_or_default();
    Ok((response.status(), text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> RemoteStore {
        RemoteStore::new(BackendConfig {
            project_id: "vip-proj".into(),
            api_key: "KEY".into(),
            collection: "shared-vips".into(),
        })
    }

    #[test]
    fn builds_collection_and_document_urls() {
        let store = store();
        assert_eq!(
            store.collection_url(),
            "https://firestore.googleapis.com/v1/projects/vip-proj/databases/(default)/documents/shared-vips?key=KEY"
        );
        assert!(store.document_url("abc123").ends_with("/documents/shared-vips/abc123?key=KEY"));
    }

    #[test]
    fn reads_sorted_names_and_skips_nameless_documents() {
        let body = r#"{
            "documents": [
                { "name": "projects/p/databases/(default)/documents/shared-vips/d1",
                  "fields": { "name": { "stringValue": "Grace Hopper" } } },
                { "name": "projects/p/databases/(default)/documents/shared-vips/d2",
                  "fields": { "createdAt": { "timestampValue": "2024-01-01T00:00:00Z" } } },
                { "name": "projects/p/databases/(default)/documents/shared-vips/d3",
                  "fields": { "name": { "stringValue": "Ada" } } }
            ]
        }"#;
        let documents = parse_documents(body).unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(documents[0].doc_id(), "d1");
        assert_eq!(documents[1].vip_name(), None);
        assert_eq!(names_from_documents(&documents).names(), ["Ada", "Grace Hopper"]);
    }

    #[test]
    fn empty_collection_body_has_no_documents() {
        assert!(parse_documents("{}").unwrap().is_empty());
        assert!(parse_documents("").unwrap().is_empty());
    }

    #[test]
    fn new_document_carries_name_and_timestamps() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let body = new_document_body("Ada", now);
        assert_eq!(body["fields"]["name"]["stringValue"], "Ada");
        assert_eq!(body["fields"]["createdAt"]["timestampValue"], "2024-05-01T12:30:00.000Z");
        assert_eq!(
            body["fields"]["createdAt"],
            body["fields"]["updatedAt"]
        );
    }
}
