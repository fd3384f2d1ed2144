//! String helpers: ids, names, excerpts and shortcode cleanup.

use regex::Regex;

use super::error::Result;
use crate::data::NodeKind;

const EXCERPT_CHARS: usize = 100;

/// Node type for a top-level content directory. Unknown directories hold
/// thoughts.
pub fn category_kind(category: &str) -> NodeKind {
	match category {
		"passions" => NodeKind::Passion,
		"books" => NodeKind::Book,
		"project" => NodeKind::Project,
		"tech-project" => NodeKind::TechProject,
		"thought" => NodeKind::Thought,
		"experience" => NodeKind::Experience,
		"publication" => NodeKind::Publication,
		_ => NodeKind::Thought,
	}
}

/// `<category>-<slug>`, lowercased, each whitespace run turned into one `-`.
pub fn node_id(category: &str, slug: &str) -> String {
	let mut id = String::with_capacity(category.len() + slug.len() + 1);
	let mut in_space = false;
	for c in format!("{category}-{slug}").to_lowercase().chars() {
		if c.is_whitespace() {
			if !in_space {
				id.push('-');
			}
			in_space = true;
		} else {
			id.push(c);
			in_space = false;
		}
	}
	id
}

pub fn hub_id(category: &str) -> String {
	format!("cat-{category}")
}

pub fn capitalize(s: &str) -> String {
	let mut chars = s.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}

/// Fallback description: the start of the body without markdown emphasis.
pub fn excerpt(body: &str) -> String {
	let mut text: String = body
		.chars()
		.take(EXCERPT_CHARS)
		.filter(|c| !matches!(c, '#' | '*' | '`'))
		.collect();
	text.push_str("...");
	text
}

/// Rewrites Hugo shortcodes: YouTube embeds become plain links, anything
/// else is dropped.
pub struct ShortcodeCleaner {
	youtube: Regex,
	any: Regex,
}

impl ShortcodeCleaner {
	pub fn new() -> Result<Self> {
		Ok(Self {
			youtube: Regex::new(r"\{\{< youtube (.*?) >\}\}")?,
			any: Regex::new(r"\{\{< .*? >\}\}")?,
		})
	}

	pub fn clean(&self, body: &str) -> String {
		let linked = self.youtube.replace_all(
			body,
			"\n\n[Watch Video on YouTube](https://www.youtube.com/watch?v=${1})\n\n",
		);
		self.any.replace_all(&linked, "").into_owned()
	}
}
