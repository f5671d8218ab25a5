use super::types::{AdminUpdate, DeleteTarget, NewAdmin, Page, Resource, SearchScope, SystemStats};
use crate::error::AdminError;
use anyhow::Context;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Client for the admin panel's JSON endpoints.
///
/// Plain request/response; nothing here streams.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AdminClient {
    pub fn new(http: reqwest::Client, base_url: &str) -> anyhow::Result<Self> {
        let mut base_url = Url::parse(base_url)
            .with_context(|| format!("invalid backend URL: {base_url}"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub async fn list(&self, resource: Resource, page: u32, per_page: u32) -> Result<Page, AdminError> {
        let page = page.max(1);
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let value: Value = self
            .send(Method::GET, &format!("admin/{}", resource.key()), &query, None::<&()>)
            .await?;
        Page::from_value(resource, page, per_page, value)
    }

    pub async fn search(
        &self,
        scope: SearchScope,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Page, AdminError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AdminError::Invalid("search query is empty"));
        }
        let resource = Resource::from(scope);
        let page = page.max(1);
        let params = [
            ("type", resource.key().to_string()),
            ("query", query.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        let value: Value = self
            .send(Method::GET, "admin/search", &params, None::<&()>)
            .await?;
        Page::from_value(resource, page, per_page, value)
    }

    pub async fn user_detail(&self, email: &str) -> Result<Value, AdminError> {
        let path = format!("admin/user/{}", urlencoding::encode(email));
        self.send(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn conversation_detail(&self, id: &str) -> Result<Value, AdminError> {
        let path = format!("admin/conversation/{}", urlencoding::encode(id));
        self.send(Method::GET, &path, &[], None::<&()>).await
    }

    pub async fn stats(&self) -> Result<SystemStats, AdminError> {
        self.send(Method::GET, "admin/stats", &[], None::<&()>).await
    }

    pub async fn delete(&self, target: &DeleteTarget) -> Result<(), AdminError> {
        let value: Value = self
            .send(Method::DELETE, &target.path(), &[], None::<&()>)
            .await?;
        expect_success(&value)
    }

    pub async fn add_admin(&self, admin: &NewAdmin) -> Result<(), AdminError> {
        if admin.username.trim().is_empty() {
            return Err(AdminError::Invalid("username is required"));
        }
        if admin.password.is_empty() {
            return Err(AdminError::Invalid("password is required"));
        }
        let value: Value = self
            .send(Method::POST, "admin/admin/add", &[], Some(admin))
            .await?;
        expect_success(&value)
    }

    pub async fn update_admin(&self, id: i64, update: &AdminUpdate) -> Result<(), AdminError> {
        let path = format!("admin/admin/{id}/update");
        let value: Value = self.send(Method::POST, &path, &[], Some(update)).await?;
        expect_success(&value)
    }

    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, AdminError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| AdminError::Shape(format!("bad path {path}: {e}")))?;
        tracing::debug!(%method, %url, "admin request");

        let mut req = self.http.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req.send().await.map_err(|source| AdminError::Request {
            path: path.to_string(),
            source,
        })?;
        let status = resp.status();
        let text = resp.text().await.map_err(|source| AdminError::Request {
            path: path.to_string(),
            source,
        })?;

        // Error bodies are JSON too; prefer their message over the bare status.
        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(_) if !status.is_success() => return Err(AdminError::Status { status }),
            Err(e) => return Err(AdminError::Shape(format!("{path}: {e}"))),
        };
        if let Some(message) = value.get("error").filter(|v| !v.is_null()) {
            let message = match message {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Err(AdminError::Api { status, message });
        }
        if !status.is_success() {
            return Err(AdminError::Status { status });
        }

        serde_json::from_value(value).map_err(|e| AdminError::Shape(format!("{path}: {e}")))
    }
}

fn expect_success(value: &Value) -> Result<(), AdminError> {
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        Ok(())
    } else {
        Err(AdminError::Shape(format!("expected success flag, got {value}")))
    }
}
