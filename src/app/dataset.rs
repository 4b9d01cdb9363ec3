//! Dataset and showcase record assembly
//!
//! Catalog records are open JSON objects: a fixed core built here, then a
//! static YAML mapping (license, maintainer, methodology text) merged on
//! top at publish time. Resources ride alongside the dataset fields and
//! are uploaded individually by the catalog client.

use std::path::Path;

use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crate::app::models::Resource;
use crate::constants::hdx;
use crate::errors::{MetadataError, MetadataResult};

/// Slug used as the catalog name for a title
///
/// Lowercases, maps every non-alphanumeric run to a single hyphen, and
/// trims hyphens from both ends.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Catalog rendering of a date range: day precision expanded to the full
/// first and last second
pub fn render_time_period(start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "[{}T00:00:00 TO {}T23:59:59]",
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d")
    )
}

/// The dataset record under assembly
#[derive(Debug, Clone)]
pub struct DatasetRecord {
    name: String,
    fields: Map<String, Value>,
    resources: Vec<Resource>,
}

impl DatasetRecord {
    /// Creates a dataset shell with its name slugged from the title
    pub fn new(title: &str) -> Self {
        let name = slugify(title);
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("title".to_string(), Value::String(title.to_string()));
        Self {
            name,
            fields,
            resources: Vec::new(),
        }
    }

    /// Catalog name (slug) of this dataset
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a tag to the record's tag list
    pub fn add_tag(&mut self, tag: &str) {
        let tags = self
            .fields
            .entry("tags")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(tags) = tags {
            tags.push(json!({ "name": tag }));
        }
    }

    /// Marks whether the dataset carries subnational detail
    pub fn set_subnational(&mut self, subnational: bool) {
        let flag = if subnational { "1" } else { "0" };
        self.fields
            .insert("subnational".to_string(), Value::String(flag.to_string()));
    }

    /// Adds a non-country location grouping such as `world`
    pub fn add_other_location(&mut self, code: &str) {
        let groups = self
            .fields
            .entry("groups")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(groups) = groups {
            groups.push(json!({ "name": code }));
        }
    }

    /// Sets the dataset time period from an aggregated window
    pub fn set_time_period(&mut self, start: NaiveDate, end: NaiveDate) {
        self.fields.insert(
            "dataset_date".to_string(),
            Value::String(render_time_period(start, end)),
        );
    }

    /// Appends a resource; callers control the final ordering
    pub fn add_resource(&mut self, resource: Resource) {
        self.resources.push(resource);
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Reads a field of the record, if set
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Merges a static YAML mapping into the record
    ///
    /// YAML values win on key collisions; the static file is the
    /// authoritative source for license, maintainer and methodology
    /// fields.
    pub fn update_from_yaml(&mut self, path: &Path) -> MetadataResult<()> {
        let raw = std::fs::read_to_string(path)?;
        let parsed: serde_yaml::Value = serde_yaml::from_str(&raw)?;
        let value = serde_json::to_value(parsed).map_err(|_| MetadataError::NotAMapping {
            path: path.to_path_buf(),
        })?;
        let Value::Object(mapping) = value else {
            return Err(MetadataError::NotAMapping {
                path: path.to_path_buf(),
            });
        };
        for (key, value) in mapping {
            self.fields.insert(key, value);
        }
        Ok(())
    }

    /// The package payload submitted to the catalog (fields only;
    /// resource files are uploaded separately)
    pub fn to_payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// The showcase record linked to the dataset
#[derive(Debug, Clone)]
pub struct ShowcaseRecord {
    name: String,
    fields: Map<String, Value>,
}

impl ShowcaseRecord {
    /// Creates the showcase shell for a dataset
    pub fn new(dataset_name: &str, title: &str) -> Self {
        let name = format!("{dataset_name}-showcase");
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(name.clone()));
        fields.insert("title".to_string(), Value::String(title.to_string()));
        fields.insert(
            "notes".to_string(),
            Value::String(hdx::SHOWCASE_NOTES.to_string()),
        );
        fields.insert(
            "url".to_string(),
            Value::String(hdx::SHOWCASE_URL.to_string()),
        );
        fields.insert(
            "image_url".to_string(),
            Value::String(hdx::SHOWCASE_IMAGE_URL.to_string()),
        );
        Self { name, fields }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a tag to the record's tag list
    pub fn add_tag(&mut self, tag: &str) {
        let tags = self
            .fields
            .entry("tags")
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(tags) = tags {
            tags.push(json!({ "name": tag }));
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_payload(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
