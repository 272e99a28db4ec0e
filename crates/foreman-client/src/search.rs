//! Resilient resource search.
//!
//! A search is a `GET <resource>?search=...&per_page=...` retried along a
//! [`RetryPolicy`], followed by a two-pass disambiguation over `results`:
//! an exact `title` match first, then an exact `name` match. Retries guard
//! only the fetch; an empty or unmatched result set is a final answer.

use std::fmt;

use url::form_urlencoded;

use crate::envelope::{Envelope, Resource};
use crate::error::{ForemanError, ForemanResult};
use crate::retry::{RetryPolicy, Sleeper};
use crate::transport::{Method, Transport};

/// Page size used to approximate fetching every match in one request.
pub const DEFAULT_PER_PAGE: u32 = 10000;

/// Server-side search operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Free-text search: `search=<query>`.
    #[default]
    Exact,
    /// Substring match on the name: `search=name~<query>`.
    NameSubstring,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Exact => f.write_str("exact"),
            MatchMode::NameSubstring => f.write_str("name-substring"),
        }
    }
}

/// One search request against a resource collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub resource: String,
    /// Unescaped query text; disambiguation compares against this.
    pub text: String,
    pub mode: MatchMode,
    pub per_page: u32,
}

impl SearchQuery {
    pub fn new(resource: &str, text: &str, mode: MatchMode) -> Self {
        Self {
            resource: resource.to_string(),
            text: text.to_string(),
            mode,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    pub fn exact(resource: &str, text: &str) -> Self {
        Self::new(resource, text, MatchMode::Exact)
    }

    pub fn name_substring(resource: &str, text: &str) -> Self {
        Self::new(resource, text, MatchMode::NameSubstring)
    }

    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    /// Request path relative to the API base URL.
    pub fn path(&self) -> String {
        let escaped: String = form_urlencoded::byte_serialize(self.text.as_bytes()).collect();
        let term = match self.mode {
            MatchMode::Exact => escaped,
            MatchMode::NameSubstring => format!("name~{escaped}"),
        };
        format!(
            "{}?search={}&per_page={}",
            self.resource, term, self.per_page
        )
    }
}

/// Search operations over a borrowed transport.
///
/// Holds no state of its own; every call issues fresh requests.
pub struct ResourceSearch<'a, T: Transport + ?Sized> {
    transport: &'a T,
    policy: &'a RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a, T: Transport + ?Sized> ResourceSearch<'a, T> {
    pub fn new(transport: &'a T, policy: &'a RetryPolicy, sleeper: &'a dyn Sleeper) -> Self {
        Self {
            transport,
            policy,
            sleeper,
        }
    }

    /// Find the resource whose `title`, or failing that `name`, equals `query`.
    pub fn exact(&self, resource: &str, query: &str) -> ForemanResult<Resource> {
        self.find_one(&SearchQuery::exact(resource, query))
    }

    /// Like [`ResourceSearch::exact`], but asks the server for a substring
    /// match on the name before disambiguating.
    pub fn by_name(&self, resource: &str, query: &str) -> ForemanResult<Resource> {
        self.find_one(&SearchQuery::name_substring(resource, query))
    }

    /// Return the whole result envelope when anything matched.
    ///
    /// No disambiguation is applied; interpreting the results is up to the
    /// caller.
    pub fn any(&self, resource: &str, query: &str) -> ForemanResult<Envelope> {
        let search = SearchQuery::exact(resource, query);
        let envelope = self.fetch(&search)?;
        if envelope.is_empty() {
            return Err(not_found(&search));
        }
        Ok(envelope)
    }

    /// Fetch and disambiguate an arbitrary query.
    pub fn find_one(&self, search: &SearchQuery) -> ForemanResult<Resource> {
        let envelope = self.fetch(search)?;
        if envelope.is_empty() {
            return Err(not_found(search));
        }
        let candidates = envelope.len();
        envelope.into_match(&search.text).ok_or_else(|| {
            tracing::debug!(
                resource = %search.resource,
                query = %search.text,
                candidates,
                "No exact title or name match"
            );
            not_found(search)
        })
    }

    /// Fetch and decode the result envelope, retrying failed attempts.
    pub fn fetch(&self, search: &SearchQuery) -> ForemanResult<Envelope> {
        let path = search.path();
        self.policy.run(self.sleeper, |attempt| {
            tracing::debug!(%path, attempt, mode = %search.mode, "Searching");
            let object = self.transport.request(Method::Get, &path, None)?;
            Envelope::from_object(object)
        })
    }
}

fn not_found(search: &SearchQuery) -> ForemanError {
    tracing::debug!(resource = %search.resource, query = %search.text, "Resource not found");
    ForemanError::not_found(&search.resource, &search.text)
}
