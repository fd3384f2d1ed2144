//! Assembles the me → hub → content hierarchy and checks it.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::data::{GraphData, GraphLink, GraphNode, NodeContent, NodeKind};

use super::text::{capitalize, category_kind, hub_id, node_id};

pub const ME_ID: &str = "me";
const CONTENT_VAL: f64 = 10.0;
const HUB_VAL: f64 = 20.0;
const ME_VAL: f64 = 30.0;

/// One publishable markdown file, already cleaned.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
	pub id: String,
	pub category: String,
	pub title: String,
	pub desc: String,
	pub img: Option<String>,
	pub date: Option<String>,
	pub tags: Vec<String>,
	pub body: String,
}

#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<GraphNode>,
	links: Vec<GraphLink>,
	content: BTreeMap<String, NodeContent>,
	categories: Vec<String>,
}

impl GraphBuilder {
	/// Categories in the order their first post was added.
	pub fn categories(&self) -> &[String] {
		&self.categories
	}

	pub fn add(&mut self, entry: Entry) {
		if !self.categories.contains(&entry.category) {
			self.categories.push(entry.category.clone());
		}
		self.nodes.push(GraphNode {
			id: entry.id.clone(),
			name: entry.title.clone(),
			kind: category_kind(&entry.category),
			val: CONTENT_VAL,
			desc: Some(entry.desc),
			img: entry.img,
			link: Some(entry.id.clone()),
		});
		self.links.push(GraphLink {
			source: hub_id(&entry.category),
			target: entry.id.clone(),
		});
		self.content.insert(
			entry.id.clone(),
			NodeContent {
				id: entry.id,
				title: entry.title,
				content: entry.body,
				date: entry.date,
				tags: Some(entry.tags),
			},
		);
	}

	/// Adds one hub per category seen and the root node.
	pub fn finish(mut self, me_name: &str, me_desc: &str) -> (GraphData, BTreeMap<String, NodeContent>) {
		for category in &self.categories {
			let id = hub_id(category);
			self.nodes.push(GraphNode {
				id: id.clone(),
				name: capitalize(category),
				kind: category_kind(category),
				val: HUB_VAL,
				desc: Some(format!("Collection of {category}")),
				img: None,
				link: None,
			});
			self.links.push(GraphLink {
				source: ME_ID.to_string(),
				target: id,
			});
		}
		self.nodes.push(GraphNode {
			id: ME_ID.to_string(),
			name: me_name.to_string(),
			kind: NodeKind::Me,
			val: ME_VAL,
			desc: Some(me_desc.to_string()).filter(|d| !d.is_empty()),
			img: None,
			link: None,
		});
		(
			GraphData {
				nodes: self.nodes,
				links: self.links,
			},
			self.content,
		)
	}
}

/// A break in the me → hub → content hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
	/// Number of `me` nodes, when it is not one.
	#[error("expected exactly one `me` node, found {0}")]
	MeCount(usize),
	/// The repeated id.
	#[error("duplicate node id `{0}`")]
	DuplicateId(String),
	/// A hub without a `me → hub` link.
	#[error("hub `{0}` is not linked from `me`")]
	UnlinkedHub(String),
	/// A post without a link from its category hub.
	#[error("node `{0}` is not linked from its hub")]
	Orphan(String),
	/// A link naming a node that does not exist.
	#[error("link {from} -> {to} has an unknown endpoint")]
	DanglingLink {
		/// Link source id.
		from: String,
		/// Link target id.
		to: String,
	},
}

/// Checks the graph against the me → hub → content convention. Hubs are the
/// `cat-<category>` nodes of `categories`; every other non-root node is
/// content belonging to the category its id starts with.
pub fn validate(graph: &GraphData, categories: &[String]) -> Vec<Violation> {
	let mut violations = Vec::new();

	let me_count = graph.nodes.iter().filter(|n| n.kind == NodeKind::Me).count();
	if me_count != 1 {
		violations.push(Violation::MeCount(me_count));
	}

	let mut seen = HashSet::new();
	for node in &graph.nodes {
		if !seen.insert(node.id.as_str()) {
			violations.push(Violation::DuplicateId(node.id.clone()));
		}
	}

	let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
	for link in &graph.links {
		if !seen.contains(link.source.as_str()) || !seen.contains(link.target.as_str()) {
			violations.push(Violation::DanglingLink {
				from: link.source.clone(),
				to: link.target.clone(),
			});
		}
		parents
			.entry(link.target.as_str())
			.or_default()
			.push(link.source.as_str());
	}
	let linked_from = |id: &str, parent: &str| {
		parents
			.get(id)
			.is_some_and(|sources| sources.iter().any(|&s| s == parent))
	};

	let hubs: HashSet<String> = categories.iter().map(|c| hub_id(c)).collect();
	for node in &graph.nodes {
		if node.kind == NodeKind::Me {
			continue;
		}
		if hubs.contains(&node.id) {
			if !linked_from(&node.id, ME_ID) {
				violations.push(Violation::UnlinkedHub(node.id.clone()));
			}
			continue;
		}
		// categories may contain hyphens, so the longest matching one wins
		let hub = categories
			.iter()
			.filter(|c| node.id.starts_with(&node_id(c, "")))
			.max_by_key(|c| c.len())
			.map(|c| hub_id(c));
		if !hub.is_some_and(|hub| linked_from(&node.id, &hub)) {
			violations.push(Violation::Orphan(node.id.clone()));
		}
	}
	violations
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn entry(category: &str, slug: &str) -> Entry {
		Entry {
			id: format!("{category}-{slug}"),
			category: category.into(),
			title: capitalize(slug),
			desc: "desc".into(),
			img: None,
			date: None,
			tags: vec![category.into()],
			body: "body".into(),
		}
	}

	fn categories() -> Vec<String> {
		vec!["books".into(), "tech-project".into()]
	}

	fn built() -> (GraphData, BTreeMap<String, NodeContent>) {
		let mut builder = GraphBuilder::default();
		builder.add(entry("books", "dune"));
		builder.add(entry("tech-project", "garden"));
		builder.add(entry("books", "hyperion"));
		assert_eq!(builder.categories(), categories().as_slice());
		builder.finish("Ada", "Writer")
	}

	#[test]
	fn builds_the_hierarchy() {
		let (graph, content) = built();
		let ids: Vec<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		assert_eq!(
			ids,
			vec![
				"books-dune",
				"tech-project-garden",
				"books-hyperion",
				"cat-books",
				"cat-tech-project",
				"me"
			]
		);
		assert_eq!(graph.links.len(), 5);
		assert_eq!(graph.node("cat-books").unwrap().desc.as_deref(), Some("Collection of books"));
		assert_eq!(graph.node("cat-tech-project").unwrap().kind, NodeKind::TechProject);
		assert_eq!(graph.node("books-dune").unwrap().link.as_deref(), Some("books-dune"));
		assert_eq!(content.len(), 3);
		assert_eq!(validate(&graph, &categories()), vec![]);
	}

	#[test]
	fn a_category_named_cat_is_not_mistaken_for_hubs() {
		let mut builder = GraphBuilder::default();
		builder.add(entry("cat", "whiskers"));
		builder.add(entry("books", "dune"));
		let cats = builder.categories().to_vec();
		let (graph, _) = builder.finish("Ada", "Writer");
		assert!(graph.node("cat-whiskers").is_some());
		assert!(graph.node("cat-cat").is_some());
		assert_eq!(validate(&graph, &cats), vec![]);
	}

	#[test]
	fn reports_broken_hierarchies() {
		let (mut graph, _) = built();
		graph.links.retain(|l| l.target != "cat-books" && l.target != "tech-project-garden");
		graph.links.push(GraphLink {
			source: "me".into(),
			target: "ghost".into(),
		});
		let mut dup = graph.nodes[0].clone();
		dup.kind = NodeKind::Me;
		graph.nodes.push(dup);

		let violations = validate(&graph, &categories());
		assert!(violations.contains(&Violation::MeCount(2)));
		assert!(violations.contains(&Violation::DuplicateId("books-dune".into())));
		assert!(violations.contains(&Violation::UnlinkedHub("cat-books".into())));
		assert!(violations.contains(&Violation::Orphan("tech-project-garden".into())));
		assert!(violations.contains(&Violation::DanglingLink {
			from: "me".into(),
			to: "ghost".into(),
		}));
	}
}
