//! The network document stored on a `networks` row.
//!
//! A document is a JSON object with `nodes`, `edges`, `packets` and `jobs`
//! keys. Older documents may lack some of them; readers get defaults through
//! [`NetworkDocument::view`] without the defaults being written back. Keys
//! this module does not know about are preserved across mutations.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::errors::NetworkError;

const NODES: &str = "nodes";
const EDGES: &str = "edges";
const PACKETS: &str = "packets";
const JOBS: &str = "jobs";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NetworkDocument {
    fields: Map<String, Value>,
}

/// Normalised read-only projection of a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentView {
    pub nodes: Value,
    pub edges: Value,
    pub packets: Value,
    pub jobs: Value,
}

impl NetworkDocument {
    /// The document a new network starts with.
    pub fn empty() -> Self {
        let mut fields = Map::new();
        fields.insert(NODES.to_string(), Value::Array(Vec::new()));
        fields.insert(EDGES.to_string(), Value::Array(Vec::new()));
        fields.insert(PACKETS.to_string(), Value::Null);
        fields.insert(JOBS.to_string(), Value::Array(Vec::new()));
        Self { fields }
    }

    pub fn parse(raw: &str) -> Result<Self, NetworkError> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            Ok(other) => Err(NetworkError::CorruptDocument(format!(
                "expected a JSON object, found {}",
                json_kind(&other)
            ))),
            Err(e) => Err(NetworkError::CorruptDocument(e.to_string())),
        }
    }

    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Missing arrays read as empty, missing packets as null.
    pub fn view(&self) -> DocumentView {
        DocumentView {
            nodes: self.get_or(NODES, Value::Array(Vec::new())),
            edges: self.get_or(EDGES, Value::Array(Vec::new())),
            packets: self.get_or(PACKETS, Value::Null),
            jobs: self.get_or(JOBS, Value::Array(Vec::new())),
        }
    }

    pub fn replace_nodes(&mut self, nodes: Value) {
        self.fields.insert(NODES.to_string(), nodes);
    }

    pub fn replace_edges(&mut self, edges: Value) {
        self.fields.insert(EDGES.to_string(), edges);
    }

    /// Replace both topology arrays and drop jobs left without a host.
    /// Returns the number of jobs removed.
    pub fn replace_topology(&mut self, nodes: Value, edges: Value) -> usize {
        self.replace_edges(edges);
        self.replace_nodes(nodes);
        self.prune_orphan_jobs()
    }

    /// Keep only jobs whose `host_id` is set and names a node's `data.id`.
    /// The relative order of the surviving jobs is unchanged.
    pub fn prune_orphan_jobs(&mut self) -> usize {
        let jobs = match self.fields.get(JOBS) {
            Some(Value::Array(jobs)) => jobs.clone(),
            _ => Vec::new(),
        };

        let node_ids: Vec<&Value> = match self.fields.get(NODES) {
            Some(Value::Array(nodes)) => nodes
                .iter()
                .filter_map(|node| node.get("data").and_then(|data| data.get("id")))
                .collect(),
            _ => Vec::new(),
        };

        let before = jobs.len();
        let kept: Vec<Value> = jobs
            .into_iter()
            .filter(|job| match job.get("host_id") {
                Some(host) if is_truthy(host) => node_ids.iter().any(|id| *id == host),
                _ => false,
            })
            .collect();
        let removed = before - kept.len();

        self.fields.insert(JOBS.to_string(), Value::Array(kept));
        removed
    }

    fn get_or(&self, key: &str, default: Value) -> Value {
        self.fields.get(key).cloned().unwrap_or(default)
    }
}

/// Split a combined `[nodes, edges]` request body.
pub fn split_topology(body: Value) -> Result<(Value, Value), NetworkError> {
    match body {
        Value::Array(mut pair) if pair.len() == 2 => {
            let edges = pair.pop().unwrap_or(Value::Null);
            let nodes = pair.pop().unwrap_or(Value::Null);
            Ok((nodes, edges))
        }
        other => Err(NetworkError::InvalidBody(format!(
            "expected [nodes, edges], found {}",
            json_kind(&other)
        ))),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn host(id: &str) -> Value {
        json!({"data": {"id": id, "label": id}, "position": {"x": 0, "y": 0}})
    }

    #[test]
    fn legacy_document_reads_with_defaults() {
        let doc = NetworkDocument::parse(r#"{"nodes": [{"data": {"id": "h1"}}]}"#).unwrap();
        let view = doc.view();

        assert_eq!(view.nodes, json!([{"data": {"id": "h1"}}]));
        assert_eq!(view.edges, json!([]));
        assert_eq!(view.jobs, json!([]));
        assert_eq!(view.packets, Value::Null);

        // Reading does not write the defaults back
        assert_eq!(doc.to_json_string(), r#"{"nodes":[{"data":{"id":"h1"}}]}"#);
    }

    #[test]
    fn empty_object_normalises_like_a_new_network() {
        let legacy = NetworkDocument::parse("{}").unwrap();
        assert_eq!(legacy.view(), NetworkDocument::empty().view());
    }

    #[test]
    fn parse_rejects_non_objects() {
        assert!(matches!(
            NetworkDocument::parse("[1, 2]"),
            Err(NetworkError::CorruptDocument(_))
        ));
        assert!(matches!(
            NetworkDocument::parse("{\"nodes\": "),
            Err(NetworkError::CorruptDocument(_))
        ));
    }

    #[test]
    fn replacing_topology_prunes_jobs_of_removed_hosts() {
        let mut doc = NetworkDocument::parse(
            &json!({
                "nodes": [host("h1"), host("h2"), host("h3")],
                "edges": [],
                "jobs": [
                    {"id": "j1", "host_id": "h1", "job_id": 1},
                    {"id": "j2", "host_id": "h2", "job_id": 2},
                    {"id": "j3", "host_id": "h3", "job_id": 3},
                    {"id": "j4", "host_id": "h1", "job_id": 4}
                ],
                "packets": null
            })
            .to_string(),
        )
        .unwrap();

        let removed = doc.replace_topology(
            json!([host("h1"), host("h3")]),
            json!([{"data": {"id": "e1", "source": "h1", "target": "h3"}}]),
        );

        assert_eq!(removed, 1);
        let ids: Vec<Value> = doc.view().jobs.as_array().unwrap().iter().map(|j| j["id"].clone()).collect();
        assert_eq!(ids, vec![json!("j1"), json!("j3"), json!("j4")]);
        assert_eq!(doc.view().edges.as_array().unwrap().len(), 1);
    }

    #[test]
    fn jobs_without_host_are_dropped() {
        let mut doc = NetworkDocument::empty();
        doc.fields.insert(
            JOBS.to_string(),
            json!([{"id": "a"}, {"id": "b", "host_id": ""}, {"id": "c", "host_id": null}, {"id": "d", "host_id": "h1"}]),
        );
        doc.replace_nodes(json!([host("h1")]));

        assert_eq!(doc.prune_orphan_jobs(), 3);
        assert_eq!(doc.view().jobs, json!([{"id": "d", "host_id": "h1"}]));
    }

    #[test]
    fn missing_jobs_prune_to_empty_list() {
        let mut doc = NetworkDocument::parse(r#"{"nodes": []}"#).unwrap();
        assert_eq!(doc.replace_topology(json!([host("h1")]), json!([])), 0);
        assert_eq!(doc.view().jobs, json!([]));
    }

    #[test]
    fn unknown_keys_survive_mutation() {
        let mut doc = NetworkDocument::parse(r#"{"config": {"zoom": 2}, "nodes": []}"#).unwrap();
        doc.replace_edges(json!([]));
        let value = doc.into_value();
        assert_eq!(value["config"], json!({"zoom": 2}));
    }

    #[test]
    fn split_topology_requires_a_pair() {
        let (nodes, edges) = split_topology(json!([[host("h1")], []])).unwrap();
        assert_eq!(nodes, json!([host("h1")]));
        assert_eq!(edges, json!([]));

        assert!(split_topology(json!([[]])).is_err());
        assert!(split_topology(json!({"nodes": []})).is_err());
    }
}
