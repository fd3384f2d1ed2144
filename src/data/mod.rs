//! The static knowledge base: graph nodes and links plus per-node content.
//!
//! Both files are produced offline by the `ingest` binary and embedded at
//! build time. They are parsed once and never mutated afterwards.

mod content;
mod types;

use std::collections::HashMap;
use std::sync::Arc;

use leptos::prelude::*;
use log::{error, info};

use crate::error::{Error, Result};

pub use content::NodeContent;
pub use types::{GraphData, GraphLink, GraphNode, NodeKind};

const GRAPH_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/graph.json"));
const CONTENT_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/content.json"));

/// Graph plus content, read-only once built.
#[derive(Clone, Debug, Default)]
pub struct KnowledgeBase {
	graph: GraphData,
	content: HashMap<String, NodeContent>,
}

impl KnowledgeBase {
	/// Wraps already parsed data.
	pub fn new(graph: GraphData, content: HashMap<String, NodeContent>) -> Self {
		Self { graph, content }
	}

	/// Parses the two data files.
	pub fn from_json(graph_json: &str, content_json: &str) -> Result<Self> {
		let graph = serde_json::from_str(graph_json).map_err(|source| Error::Data {
			file: "graph.json",
			source,
		})?;
		let content = serde_json::from_str(content_json).map_err(|source| Error::Data {
			file: "content.json",
			source,
		})?;
		Ok(Self::new(graph, content))
	}

	/// The data files compiled into the binary.
	pub fn embedded() -> Result<Self> {
		let kb = Self::from_json(GRAPH_JSON, CONTENT_JSON)?;
		info!(
			"Loaded knowledge base: {} nodes, {} links, {} content entries",
			kb.graph.nodes.len(),
			kb.graph.links.len(),
			kb.content.len()
		);
		Ok(kb)
	}

	/// Nodes and links as loaded.
	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	/// Graph node by id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.graph.node(id)
	}

	/// Content for a node id. Graph nodes without authored content get a
	/// synthesized placeholder; ids that are not in the graph yield `None`.
	pub fn get_content(&self, id: &str) -> Option<NodeContent> {
		let node = self.graph.node(id)?;
		Some(
			self.content
				.get(id)
				.cloned()
				.unwrap_or_else(|| NodeContent::placeholder(node)),
		)
	}
}

/// Loads the embedded knowledge base and makes it available to every page.
/// Unusable data degrades to an empty graph.
pub fn provide_knowledge_base() {
	let kb = KnowledgeBase::embedded().unwrap_or_else(|e| {
		error!("Knowledge base unavailable: {e}");
		KnowledgeBase::default()
	});
	provide_context(Arc::new(kb));
}

/// The knowledge base provided by [`provide_knowledge_base`], or an empty one.
pub fn use_knowledge_base() -> Arc<KnowledgeBase> {
	use_context::<Arc<KnowledgeBase>>().unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	const GRAPH: &str = r#"{
		"nodes": [
			{ "id": "me", "name": "Me", "type": "me", "val": 30 },
			{ "id": "cat-books", "name": "Books", "type": "book", "val": 20, "desc": "Collection of books" },
			{ "id": "books-dune", "name": "Dune", "type": "book", "val": 10, "link": "cat-books" },
			{ "id": "thought-time", "name": "On Time", "type": "thought", "val": 10 }
		],
		"links": [
			{ "source": "me", "target": "cat-books" },
			{ "source": "cat-books", "target": "books-dune" }
		]
	}"#;

	const CONTENT: &str = r#"{
		"thought-time": {
			"id": "thought-time",
			"title": "On Time",
			"content": "Time is a flat circle.",
			"date": "2024-03-01",
			"tags": ["philosophy"]
		}
	}"#;

	fn kb() -> KnowledgeBase {
		KnowledgeBase::from_json(GRAPH, CONTENT).unwrap()
	}

	#[test]
	fn present_content_is_returned_verbatim() {
		let content = kb().get_content("thought-time").unwrap();
		assert_eq!(
			content,
			NodeContent {
				id: "thought-time".into(),
				title: "On Time".into(),
				content: "Time is a flat circle.".into(),
				date: Some("2024-03-01".into()),
				tags: Some(vec!["philosophy".into()]),
			}
		);
	}

	#[test]
	fn graph_only_node_gets_placeholder() {
		let content = kb().get_content("books-dune").unwrap();
		assert_eq!(content.id, "books-dune");
		assert_eq!(content.title, "Dune");
		assert_eq!(content.tags, Some(vec!["book".to_string()]));
		assert!(content.content.starts_with("# Dune"));
		assert_eq!(content.date, None);
	}

	#[test]
	fn placeholder_includes_description() {
		let content = kb().get_content("cat-books").unwrap();
		assert!(content.content.contains("Collection of books"));
	}

	#[test]
	fn unknown_id_yields_nothing() {
		assert_eq!(kb().get_content("books-neuromancer"), None);
	}

	#[test]
	fn malformed_graph_is_an_error() {
		let err = KnowledgeBase::from_json("{\"nodes\": 3}", "{}").unwrap_err();
		assert!(matches!(err, Error::Data { file: "graph.json", .. }));
	}

	#[test]
	fn embedded_files_parse() {
		let kb = KnowledgeBase::embedded().unwrap();
		let me = kb
			.graph()
			.nodes
			.iter()
			.filter(|n| n.kind == NodeKind::Me)
			.count();
		assert_eq!(me, 1);
	}
}
