//! Document resources
//!
//! A [`DocumentResource`] is a client-side proxy for one server document. It
//! caches the fetched document and exposes the document's whitelisted methods
//! under local alias names.

use crate::api::PressApi;
use press_core::{ErrorContext, PressError, PressResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

pub struct DocumentResource {
    api: Arc<dyn PressApi>,
    doctype: String,
    name: Option<String>,
    /// alias -> server-side method name
    methods: BTreeMap<String, String>,
    doc: RwLock<Option<Value>>,
}

impl DocumentResource {
    /// Bind a resource to `doctype`/`name`. Nothing is fetched yet.
    pub fn new(api: Arc<dyn PressApi>, doctype: impl Into<String>, name: Option<String>) -> Self {
        Self {
            api,
            doctype: doctype.into(),
            name,
            methods: BTreeMap::new(),
            doc: RwLock::new(None),
        }
    }

    /// Expose server method `method` under `alias`
    pub fn with_method(mut self, alias: impl Into<String>, method: impl Into<String>) -> Self {
        self.methods.insert(alias.into(), method.into());
        self
    }

    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    /// Document name; `None` when the resource is not bound to a document
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whitelisted methods as `(alias, server method)` pairs
    pub fn whitelisted_methods(&self) -> impl Iterator<Item = (&str, &str)> {
        self.methods.iter().map(|(a, m)| (a.as_str(), m.as_str()))
    }

    pub fn server_method(&self, alias: &str) -> Option<&str> {
        self.methods.get(alias).map(String::as_str)
    }

    /// Last fetched copy of the document
    pub async fn doc(&self) -> Option<Value> {
        self.doc.read().await.clone()
    }

    /// Return the cached document, fetching it on first use
    pub async fn fetch(&self) -> PressResult<Value> {
        if let Some(doc) = self.doc.read().await.as_ref() {
            return Ok(doc.clone());
        }
        self.reload().await
    }

    /// Fetch the document from the server and replace the cached copy
    pub async fn reload(&self) -> PressResult<Value> {
        let name = self.bound_name("reload")?;
        debug!(doctype = %self.doctype, name, "Fetching document");

        let doc = self.api.get_doc(&self.doctype, name).await?;
        *self.doc.write().await = Some(doc.clone());
        Ok(doc)
    }

    /// Invoke the whitelisted method registered under `alias`
    pub async fn call(&self, alias: &str, args: Value) -> PressResult<Value> {
        let method = self.server_method(alias).ok_or_else(|| PressError::Validation {
            message: format!("'{}' is not a whitelisted method of {}", alias, self.doctype),
            field: Some("method".to_string()),
            context: ErrorContext::new("document_resource")
                .with_operation("call")
                .with_metadata("doctype", &self.doctype),
        })?;
        let name = self.bound_name(alias)?;

        debug!(doctype = %self.doctype, name, method, "Running document method");
        self.api
            .run_doc_method(&self.doctype, name, method, args)
            .await
    }

    fn bound_name(&self, operation: &str) -> PressResult<&str> {
        self.name().ok_or_else(|| PressError::Validation {
            message: format!("{} resource is not bound to a document", self.doctype),
            field: Some("name".to_string()),
            context: ErrorContext::new("document_resource")
                .with_operation(operation)
                .with_suggestion("Log in and select a team first"),
        })
    }
}

impl std::fmt::Debug for DocumentResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentResource")
            .field("doctype", &self.doctype)
            .field("name", &self.name)
            .field("methods", &self.methods)
            .finish()
    }
}
