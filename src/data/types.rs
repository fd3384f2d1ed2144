use std::collections::HashMap;
use std::fmt;

use log::warn;
use serde::{Deserialize, Deserializer, Serialize};

/// Category of a node. Drives color, icon and 3D shape.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeKind {
	/// The single root node.
	Me,
	/// Hobbies and interests.
	Passion,
	/// A book read or reviewed.
	Book,
	/// Non-software projects.
	Project,
	/// Serialized as `tech-project`.
	TechProject,
	/// Drawn as a glow sprite.
	Thought,
	/// Drawn as a glass sphere.
	Experience,
	/// Papers and articles.
	Publication,
	/// Anything outside the closed set, hubs included. Keeps the raw string.
	Other(String),
}

impl NodeKind {
	/// Every member of the closed set, in table order.
	pub const KNOWN: [NodeKind; 8] = [
		NodeKind::Me,
		NodeKind::Passion,
		NodeKind::Book,
		NodeKind::Project,
		NodeKind::TechProject,
		NodeKind::Thought,
		NodeKind::Experience,
		NodeKind::Publication,
	];

	/// The wire form used in `graph.json`.
	pub fn as_str(&self) -> &str {
		match self {
			NodeKind::Me => "me",
			NodeKind::Passion => "passion",
			NodeKind::Book => "book",
			NodeKind::Project => "project",
			NodeKind::TechProject => "tech-project",
			NodeKind::Thought => "thought",
			NodeKind::Experience => "experience",
			NodeKind::Publication => "publication",
			NodeKind::Other(raw) => raw,
		}
	}

	/// Human readable form, e.g. `tech project`.
	pub fn label(&self) -> String {
		self.as_str().replace('-', " ")
	}
}

impl From<&str> for NodeKind {
	fn from(value: &str) -> Self {
		match value {
			"me" => NodeKind::Me,
			"passion" => NodeKind::Passion,
			"book" => NodeKind::Book,
			"project" => NodeKind::Project,
			"tech-project" => NodeKind::TechProject,
			"thought" => NodeKind::Thought,
			"experience" => NodeKind::Experience,
			"publication" => NodeKind::Publication,
			other => NodeKind::Other(other.to_string()),
		}
	}
}

impl From<String> for NodeKind {
	fn from(value: String) -> Self {
		NodeKind::from(value.as_str())
	}
}

impl From<NodeKind> for String {
	fn from(value: NodeKind) -> Self {
		match value {
			NodeKind::Other(raw) => raw,
			known => known.as_str().to_string(),
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

fn default_val() -> f64 {
	1.0
}

/// Generated files write `""` for "no value"; treat it like a missing field.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<String>::deserialize(deserializer)?;
	Ok(value.filter(|s| !s.trim().is_empty()))
}

/// One vertex of the knowledge graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
	/// Lowercase, hyphenated and unique.
	pub id: String,
	/// Display title.
	pub name: String,
	/// Serialized as `type`.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Relative size weight; hubs and the root are larger than posts.
	#[serde(default = "default_val")]
	pub val: f64,
	/// Short description shown in the overlay.
	#[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
	pub desc: Option<String>,
	/// Image URL, mapped onto the node's sphere.
	#[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
	pub img: Option<String>,
	/// External URL or the id of another node.
	#[serde(default, deserialize_with = "empty_as_none", skip_serializing_if = "Option::is_none")]
	pub link: Option<String>,
}

/// Undirected edge between two node ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphLink {
	/// Id of one endpoint; links are drawn from here.
	pub source: String,
	/// Id of the other endpoint.
	pub target: String,
}

/// The contents of `graph.json`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
	/// In file order; ids should be unique.
	pub nodes: Vec<GraphNode>,
	/// May name missing nodes, which are then not drawn.
	pub links: Vec<GraphLink>,
}

impl GraphData {
	/// Maps ids to node indices. Duplicate ids resolve to the first occurrence.
	pub fn id_index(&self) -> HashMap<&str, usize> {
		let mut index = HashMap::with_capacity(self.nodes.len());
		for (i, node) in self.nodes.iter().enumerate() {
			index.entry(node.id.as_str()).or_insert(i);
		}
		index
	}

	/// First node with this id.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Links whose endpoints both resolve, as `(source, target)` node indices.
	/// Dangling links are dropped here and nowhere else.
	pub fn drawable_links(&self) -> Vec<(usize, usize)> {
		let index = self.id_index();
		self.links
			.iter()
			.filter_map(|link| {
				match (
					index.get(link.source.as_str()),
					index.get(link.target.as_str()),
				) {
					(Some(&src), Some(&tgt)) => Some((src, tgt)),
					_ => {
						warn!(
							"skipping link {} -> {}: unknown endpoint",
							link.source, link.target
						);
						None
					}
				}
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn node(id: &str, kind: &str) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.into(),
			kind: kind.into(),
			val: 10.0,
			desc: None,
			img: None,
			link: None,
		}
	}

	fn link(source: &str, target: &str) -> GraphLink {
		GraphLink {
			source: source.into(),
			target: target.into(),
		}
	}

	#[test]
	fn kind_round_trips_unknown_strings() {
		let kind = NodeKind::from("hub");
		assert_eq!(kind, NodeKind::Other("hub".into()));
		assert_eq!(String::from(kind), "hub");
		assert_eq!(NodeKind::from("tech-project").label(), "tech project");
	}

	#[test]
	fn dangling_links_are_dropped_without_touching_the_rest() {
		let data = GraphData {
			nodes: vec![node("me", "me"), node("cat-books", "book"), node("books-dune", "book")],
			links: vec![
				link("me", "cat-books"),
				link("cat-books", "ghost"),
				link("cat-books", "books-dune"),
				link("nobody", "me"),
			],
		};
		assert_eq!(data.drawable_links(), vec![(0, 1), (1, 2)]);
	}

	#[test]
	fn duplicate_ids_resolve_to_first_occurrence() {
		let data = GraphData {
			nodes: vec![node("a", "me"), node("a", "book"), node("b", "book")],
			links: vec![link("a", "b")],
		};
		assert_eq!(data.drawable_links(), vec![(0, 2)]);
		assert_eq!(data.node("a").map(|n| &n.kind), Some(&NodeKind::Me));
	}

	#[test]
	fn empty_strings_deserialize_as_missing() {
		let json = r#"{"id":"x","name":"X","type":"book","val":10,"img":"","desc":"d"}"#;
		let parsed: GraphNode = serde_json::from_str(json).unwrap();
		assert_eq!(parsed.img, None);
		assert_eq!(parsed.desc.as_deref(), Some("d"));
		assert_eq!(parsed.link, None);
	}
}
