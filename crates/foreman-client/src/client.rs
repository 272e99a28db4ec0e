//! The Foreman client facade.

use std::sync::Arc;

use serde::Serialize;

use crate::config::ClientConfig;
use crate::envelope::{Envelope, Object, Resource};
use crate::error::{ForemanError, ForemanResult};
use crate::retry::{RetryPolicy, Sleeper, ThreadSleeper};
use crate::search::{ResourceSearch, SearchQuery};
use crate::transport::{HttpTransport, Method, Transport};

/// A host to be created and built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewHost {
    /// Sent as a string, the way the API's host form expects it.
    #[serde(serialize_with = "serialize_as_string")]
    pub hostgroup_id: u64,
    pub name: String,
    pub mac: String,
    pub build: bool,
}

impl NewHost {
    /// A host in `hostgroup_id` with build mode on.
    pub fn new(hostgroup_id: u64, name: &str, mac: &str) -> Self {
        Self {
            hostgroup_id,
            name: name.to_string(),
            mac: mac.to_string(),
            build: true,
        }
    }
}

fn serialize_as_string<S: serde::Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

#[derive(Serialize)]
struct HostPayload<'a> {
    host: &'a NewHost,
}

/// Authenticated access to one Foreman server.
///
/// Configuration is fixed at construction and shared by reference with the
/// transport. The client holds no mutable state, so one instance can serve
/// several threads when its transport can.
pub struct ForemanClient<T: Transport = HttpTransport> {
    config: Arc<ClientConfig>,
    transport: T,
    retry: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ForemanClient<HttpTransport> {
    /// Connect over HTTPS with the default backoff ladder.
    pub fn new(config: ClientConfig) -> ForemanResult<Self> {
        let config = Arc::new(config);
        let transport = HttpTransport::new(Arc::clone(&config))?;
        Ok(Self::from_parts(config, transport))
    }

    /// Wrap an already built [`HttpTransport`], sharing its settings.
    pub fn from_http_transport(transport: HttpTransport) -> Self {
        Self::from_parts(transport.shared_config(), transport)
    }
}

impl<T: Transport> ForemanClient<T> {
    /// Use a custom transport, e.g. a stub backend.
    ///
    /// `config` is what [`ForemanClient::config`] reports; it must be the
    /// settings the transport actually sends with. Pass the transport's own
    /// `Arc` to share one instance.
    pub fn with_transport(config: impl Into<Arc<ClientConfig>>, transport: T) -> Self {
        Self::from_parts(config.into(), transport)
    }

    fn from_parts(config: Arc<ClientConfig>, transport: T) -> Self {
        Self {
            config,
            transport,
            retry: RetryPolicy::default(),
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the backoff ladder used by searches.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replace how the backoff ladder waits.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Backoff ladder used by searches.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ── Passthroughs ────────────────────────────────────────────

    /// GET an API path. Not retried.
    pub fn get(&self, path: &str) -> ForemanResult<Object> {
        self.transport.request(Method::Get, path, None)
    }

    /// DELETE an API path. Not retried.
    pub fn delete(&self, path: &str) -> ForemanResult<Object> {
        self.transport.request(Method::Delete, path, None)
    }

    /// POST `body` encoded as JSON.
    pub fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ForemanResult<Object> {
        let bytes = encode(body)?;
        self.post_raw(path, &bytes)
    }

    /// PUT `body` encoded as JSON.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ForemanResult<Object> {
        let bytes = encode(body)?;
        self.put_raw(path, &bytes)
    }

    /// POST an already encoded JSON body.
    pub fn post_raw(&self, path: &str, body: &[u8]) -> ForemanResult<Object> {
        self.transport.request(Method::Post, path, Some(body))
    }

    /// PUT an already encoded JSON body.
    pub fn put_raw(&self, path: &str, body: &[u8]) -> ForemanResult<Object> {
        self.transport.request(Method::Put, path, Some(body))
    }

    // ── Search ──────────────────────────────────────────────────

    fn searcher(&self) -> ResourceSearch<'_, T> {
        ResourceSearch::new(&self.transport, &self.retry, self.sleeper.as_ref())
    }

    /// Exact search: the result whose `title`, else `name`, equals `query`.
    pub fn search_resource(&self, resource: &str, query: &str) -> ForemanResult<Resource> {
        self.searcher().exact(resource, query)
    }

    /// Server-side `name~` search, then the same exact disambiguation.
    pub fn search_resource_name(&self, resource: &str, query: &str) -> ForemanResult<Resource> {
        self.searcher().by_name(resource, query)
    }

    /// Every match of a free-text search, undisambiguated.
    pub fn search_any_resource(&self, resource: &str, query: &str) -> ForemanResult<Envelope> {
        self.searcher().any(resource, query)
    }

    /// Fetch an arbitrary query and disambiguate it like an exact search.
    pub fn search(&self, query: &SearchQuery) -> ForemanResult<Resource> {
        self.searcher().find_one(query)
    }

    // ── Hosts ───────────────────────────────────────────────────

    /// Create a host and return its new id as a decimal string.
    pub fn create_host(&self, host: &NewHost) -> ForemanResult<String> {
        let created = Resource::new(self.post("hosts", &HostPayload { host })?);
        let id = created.id_string().ok_or_else(|| {
            ForemanError::Decode("create response has no numeric 'id'".to_string())
        })?;
        tracing::info!(host = %host.name, %id, "Created host");
        Ok(id)
    }

    /// Delete the host with the given id.
    pub fn delete_host(&self, id: &str) -> ForemanResult<()> {
        self.delete(&format!("hosts/{id}"))?;
        tracing::info!(%id, "Deleted host");
        Ok(())
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> ForemanResult<Vec<u8>> {
    serde_json::to_vec(body).map_err(|e| ForemanError::Encode(e.to_string()))
}
