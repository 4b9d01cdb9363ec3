//! Thin HDX catalog client
//!
//! Name-based upsert against the CKAN-style action API: `package_show`
//! decides between `package_create` and `package_update`, resource files
//! go up as multipart uploads, and the showcase is upserted and associated
//! with the dataset through the showcase extension actions. The API key
//! rides in the `Authorization` header; there is no session handling and
//! no retry logic beyond what the transport itself does.

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::{json, Value};
use url::Url;

use crate::app::dataset::{DatasetRecord, ShowcaseRecord};
use crate::app::models::Resource;
use crate::constants::{env as env_constants, hdx};
use crate::errors::{CatalogError, CatalogResult};

/// Client for one HDX site
#[derive(Debug)]
pub struct HdxClient {
    client: Client,
    site_url: Url,
    api_key: String,
}

impl HdxClient {
    /// Creates a client for `site_url` with the API key from the
    /// environment
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingApiKey` if `HDX_API_KEY` is unset
    /// and `CatalogError::InvalidUrl` if the site URL does not parse.
    pub fn from_env(client: Client, site_url: &str) -> CatalogResult<Self> {
        let api_key = std::env::var(env_constants::HDX_API_KEY)
            .map_err(|_| CatalogError::MissingApiKey)?;
        let site_url = Url::parse(site_url).map_err(|_| CatalogError::InvalidUrl {
            url: site_url.to_string(),
        })?;
        Ok(Self {
            client,
            site_url,
            api_key,
        })
    }

    /// Upserts the dataset and uploads every resource, in order
    pub async fn upsert_dataset(&self, dataset: &DatasetRecord) -> CatalogResult<()> {
        let existing = self.try_show("package_show", dataset.name()).await?;

        let mut payload = dataset.to_payload();
        payload["updated_by_script"] = json!(hdx::UPDATED_BY_SCRIPT);

        let action = if existing.is_some() {
            "package_update"
        } else {
            "package_create"
        };
        tracing::info!("{} dataset '{}'", action, dataset.name());
        let package = self.action(action, &payload).await?;
        let package_id = required_str(&package, "id", action)?.to_string();

        let existing_resources = resource_ids_by_name(existing.as_ref());
        for resource in dataset.resources() {
            self.upsert_resource(&package_id, resource, existing_resources.get(&resource.name))
                .await?;
        }
        Ok(())
    }

    /// Upserts the showcase and associates it with the dataset
    pub async fn upsert_showcase(
        &self,
        showcase: &ShowcaseRecord,
        dataset_name: &str,
    ) -> CatalogResult<()> {
        let existing = self.try_show("ckanext_showcase_show", showcase.name()).await?;
        let action = if existing.is_some() {
            "ckanext_showcase_update"
        } else {
            "ckanext_showcase_create"
        };
        tracing::info!("{} showcase '{}'", action, showcase.name());
        let created = self.action(action, &showcase.to_payload()).await?;
        let showcase_id = required_str(&created, "id", action)?.to_string();

        let association = json!({
            "showcase_id": showcase_id,
            "package_id": dataset_name,
        });
        match self
            .action("ckanext_showcase_package_association_create", &association)
            .await
        {
            Ok(_) => Ok(()),
            // Re-running after a successful publish re-creates an
            // association that already exists; the API reports that as a
            // failure we can ignore.
            Err(CatalogError::ActionFailed { message, .. })
                if message.contains("already associated") =>
            {
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Uploads one resource file, updating in place when it already exists
    async fn upsert_resource(
        &self,
        package_id: &str,
        resource: &Resource,
        existing_id: Option<&String>,
    ) -> CatalogResult<()> {
        let bytes = tokio::fs::read(&resource.upload_path).await?;
        let part = Part::bytes(bytes).file_name(resource.name.clone());

        let mut form = Form::new()
            .text("package_id", package_id.to_string())
            .text("name", resource.name.clone())
            .text("description", resource.description.clone())
            .text("format", resource.format.clone())
            .text("created", resource.created_stamp())
            .text("last_modified", resource.last_modified_stamp())
            .text("resource_type", "file.upload")
            .text("url_type", "upload")
            .part("upload", part);

        let action = match existing_id {
            Some(id) => {
                form = form.text("id", id.clone());
                "resource_update"
            }
            None => "resource_create",
        };

        tracing::info!("{} resource '{}'", action, resource.name);
        let response = self
            .client
            .post(self.action_url(action)?)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .multipart(form)
            .send()
            .await?;
        unwrap_envelope(action, response).await.map(|_| ())
    }

    /// Calls a read action, mapping "not found" to `None`
    async fn try_show(&self, action: &str, name: &str) -> CatalogResult<Option<Value>> {
        match self.action(action, &json!({ "id": name })).await {
            Ok(value) => Ok(Some(value)),
            Err(CatalogError::ActionFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Calls one JSON action and unwraps its result envelope
    async fn action(&self, action: &str, payload: &Value) -> CatalogResult<Value> {
        let response = self
            .client
            .post(self.action_url(action)?)
            .header(reqwest::header::AUTHORIZATION, &self.api_key)
            .json(payload)
            .send()
            .await?;
        unwrap_envelope(action, response).await
    }

    fn action_url(&self, action: &str) -> CatalogResult<Url> {
        self.site_url
            .join(&format!("/api/3/action/{action}"))
            .map_err(|_| CatalogError::InvalidUrl {
                url: format!("{}/api/3/action/{action}", self.site_url),
            })
    }
}

/// Unwraps the `{"success": ..., "result": ...}` action envelope
async fn unwrap_envelope(action: &str, response: reqwest::Response) -> CatalogResult<Value> {
    let status = response.status();
    let mut body: Value = match response.json().await {
        Ok(body) => body,
        Err(_) => {
            return Err(CatalogError::ActionFailed {
                action: action.to_string(),
                message: format!("HTTP {status} with non-JSON body"),
            })
        }
    };

    if body["success"] == json!(true) {
        return Ok(body["result"].take());
    }

    let message = match &body["error"] {
        Value::Null => format!("HTTP {status}"),
        error => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string()),
    };
    Err(CatalogError::ActionFailed {
        action: action.to_string(),
        message,
    })
}

fn required_str<'a>(value: &'a Value, key: &str, action: &str) -> CatalogResult<&'a str> {
    value[key]
        .as_str()
        .ok_or_else(|| CatalogError::UnexpectedResponse {
            action: action.to_string(),
        })
}

/// Maps existing resource names to their catalog ids
fn resource_ids_by_name(package: Option<&Value>) -> HashMap<String, String> {
    let mut ids = HashMap::new();
    let Some(resources) = package.and_then(|p| p["resources"].as_array()) else {
        return ids;
    };
    for resource in resources {
        if let (Some(name), Some(id)) = (resource["name"].as_str(), resource["id"].as_str()) {
            ids.insert(name.to_string(), id.to_string());
        }
    }
    ids
}
