//! Subcommand implementations, independent of argument parsing.

use foreman_client::{ForemanClient, ForemanError, ForemanResult, NewHost, Transport};
use serde_json::Value;

/// Which search variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Exact,
    Name,
    Any,
}

/// Run a search and return the printable result.
pub fn search<T: Transport>(
    client: &ForemanClient<T>,
    kind: SearchKind,
    resource: &str,
    query: &str,
) -> ForemanResult<Value> {
    match kind {
        SearchKind::Exact => to_value(client.search_resource(resource, query)?),
        SearchKind::Name => to_value(client.search_resource_name(resource, query)?),
        SearchKind::Any => to_value(client.search_any_resource(resource, query)?),
    }
}

pub fn get<T: Transport>(client: &ForemanClient<T>, path: &str) -> ForemanResult<Value> {
    Ok(Value::Object(client.get(path)?))
}

pub fn create_host<T: Transport>(
    client: &ForemanClient<T>,
    hostgroup_id: u64,
    name: &str,
    mac: &str,
) -> ForemanResult<String> {
    client.create_host(&NewHost::new(hostgroup_id, name, mac))
}

pub fn delete_host<T: Transport>(client: &ForemanClient<T>, id: &str) -> ForemanResult<()> {
    client.delete_host(id)
}

fn to_value<S: serde::Serialize>(value: S) -> ForemanResult<Value> {
    serde_json::to_value(value).map_err(|e| ForemanError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use foreman_client::{ClientConfig, Method, Object, RetryPolicy};
    use std::collections::BTreeMap;
    use serde_json::json;

    /// Serves one fixed list response for every GET.
    struct FixedTransport(Value);

    impl Transport for FixedTransport {
        fn request(&self, method: Method, _path: &str, _body: Option<&[u8]>) -> ForemanResult<Object> {
            match (method, &self.0) {
                (Method::Get, Value::Object(o)) => Ok(o.clone()),
                _ => Err(ForemanError::Http {
                    status: 405,
                    status_line: "405 Method Not Allowed".to_string(),
                }),
            }
        }
    }

    fn client(body: Value) -> ForemanClient<FixedTransport> {
        ForemanClient::with_transport(ClientConfig::new("h", "u", "p"), FixedTransport(body))
            .with_retry_policy(RetryPolicy::none())
    }

    #[test]
    fn test_search_kinds() {
        let c = client(json!({"total": 2, "results": [
            {"id": 1, "name": "web01"},
            {"id": 2, "title": "web01"}
        ]}));
        assert_eq!(search(&c, SearchKind::Exact, "hosts", "web01").unwrap()["id"], json!(2));
        assert_eq!(search(&c, SearchKind::Name, "hosts", "web01").unwrap()["id"], json!(2));
        let any = search(&c, SearchKind::Any, "hosts", "web01").unwrap();
        assert_eq!(any["total"], json!(2));
        assert_eq!(any["results"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_search_not_found() {
        let c = client(json!({"results": []}));
        let err = search(&c, SearchKind::Exact, "hosts", "ghost").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_get_and_failed_delete() {
        let c = client(json!({"results": [], "status": "ok"}));
        assert_eq!(get(&c, "status").unwrap()["status"], json!("ok"));
        assert_eq!(delete_host(&c, "3").unwrap_err().status(), Some(405));
    }

    #[test]
    fn test_unserializable_output_is_an_error() {
        let keyed_by_tuple = BTreeMap::from([((1, 2), "web01")]);
        let err = to_value(keyed_by_tuple).unwrap_err();
        assert!(matches!(err, ForemanError::Encode(_)));
    }
}
