//! Typed views over decoded Foreman responses.
//!
//! List endpoints answer with `{"results": [...], "total": ..., ...}`; item
//! endpoints answer with a flat object. Beyond `results` and the `title`,
//! `name`, and `id` fields nothing is modelled, so everything else stays
//! reachable as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ForemanError, ForemanResult};

/// A decoded JSON object.
pub type Object = Map<String, Value>;

/// One API resource (a host, a host group, ...).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource {
    fields: Object,
}

impl Resource {
    pub fn new(fields: Object) -> Self {
        Self { fields }
    }

    /// The `title` field, when present and a string.
    pub fn title(&self) -> Option<&str> {
        self.str_field("title")
    }

    /// The `name` field, when present and a string.
    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// The numeric `id`, when it is a non-negative integer.
    pub fn id(&self) -> Option<u64> {
        self.fields.get("id").and_then(Value::as_u64)
    }

    /// The numeric `id` rendered as a decimal string without fractional digits.
    pub fn id_string(&self) -> Option<String> {
        let id = self.fields.get("id")?;
        if let Some(n) = id.as_u64() {
            return Some(n.to_string());
        }
        if let Some(n) = id.as_i64() {
            return Some(n.to_string());
        }
        id.as_f64().map(|f| format!("{f:.0}"))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Object {
        &self.fields
    }

    pub fn into_fields(self) -> Object {
        self.fields
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

impl From<Object> for Resource {
    fn from(fields: Object) -> Self {
        Self::new(fields)
    }
}

/// A decoded list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub results: Vec<Resource>,
    /// Every other top-level key (`total`, `page`, `search`, ...).
    #[serde(flatten)]
    pub extra: Object,
}

impl Envelope {
    /// Decode a list response. `results` must be an array of objects.
    pub fn from_object(object: Object) -> ForemanResult<Self> {
        serde_json::from_value(Value::Object(object))
            .map_err(|e| ForemanError::Decode(format!("unexpected list response: {e}")))
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Pick the result that names `query` exactly.
    ///
    /// The first result whose `title` equals `query` wins; only when no title
    /// matches is the first result whose `name` equals `query` returned.
    pub fn disambiguate(&self, query: &str) -> Option<&Resource> {
        self.match_index(query).map(|index| &self.results[index])
    }

    /// Owning variant of [`Envelope::disambiguate`].
    pub fn into_match(mut self, query: &str) -> Option<Resource> {
        let index = self.match_index(query)?;
        Some(self.results.swap_remove(index))
    }

    fn match_index(&self, query: &str) -> Option<usize> {
        self.results
            .iter()
            .position(|r| r.title() == Some(query))
            .or_else(|| self.results.iter().position(|r| r.name() == Some(query)))
    }
}
