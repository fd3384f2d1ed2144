use serde::{Deserialize, Serialize};

use super::types::GraphNode;

/// Long-form content for one node, keyed by node id in `content.json`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeContent {
	/// Id of the node this belongs to.
	pub id: String,
	/// Page heading.
	pub title: String,
	/// Markdown body.
	pub content: String,
	/// Publication date as written in the source, e.g. `2023-05-01`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub date: Option<String>,
	/// Shown as chips above the article.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tags: Option<Vec<String>>,
}

impl NodeContent {
	/// Stand-in for nodes that have no authored content, such as category hubs.
	pub fn placeholder(node: &GraphNode) -> Self {
		Self {
			id: node.id.clone(),
			title: node.name.clone(),
			content: format!(
				"# {}\n\n{}\n\n*Content coming soon...*",
				node.name,
				node.desc.as_deref().unwrap_or_default()
			),
			date: None,
			tags: Some(vec![node.kind.to_string()]),
		}
	}
}
