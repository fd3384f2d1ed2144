//! Offline content ingestion: turns a tree of markdown posts into the
//! `graph.json` and `content.json` files the app embeds.
//!
//! Layout of the source tree: `<category>/<post>.md` or
//! `<category>/<post>/index.md` page bundles. Files directly under the root
//! and `_index.md` section pages are not posts.

mod error;
mod front_matter;
mod graph;
mod text;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;
use walkdir::WalkDir;

pub use error::{IngestError, Result};
pub use graph::Violation;

use front_matter::FrontMatter;
use graph::{Entry, GraphBuilder, validate};
use text::ShortcodeCleaner;

/// Where to read from and write to.
#[derive(Clone, Debug)]
pub struct IngestConfig {
	/// Root of the content tree, one directory per category.
	pub source_dir: PathBuf,
	/// Receives `graph.json` and `content.json`.
	pub data_dir: PathBuf,
	/// Receives copied images.
	pub public_dir: PathBuf,
	/// URL path under which `public_dir` is served.
	pub public_prefix: String,
	/// Name of the root node.
	pub me_name: String,
	/// Description of the root node; empty for none.
	pub me_desc: String,
	/// Parse and validate without writing or copying anything.
	pub dry_run: bool,
}

/// What a run produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Summary {
	/// Nodes written, hubs and the root included.
	pub nodes: usize,
	/// Links written.
	pub links: usize,
	/// Drafts plus files that could not be read or parsed.
	pub skipped: usize,
	/// Hierarchy problems found in the generated graph.
	pub violations: Vec<Violation>,
}

enum Outcome {
	Published(Entry),
	Draft,
}

struct Ingester<'a> {
	config: &'a IngestConfig,
	cleaner: ShortcodeCleaner,
}

impl Ingester<'_> {
	fn slug(rel: &Path, front: &FrontMatter) -> String {
		if let Some(slug) = front.slug.as_deref().filter(|s| !s.trim().is_empty()) {
			return slug.to_string();
		}
		let bundle_dir = (rel.file_name().and_then(|n| n.to_str()) == Some("index.md"))
			.then(|| rel.parent().and_then(Path::file_name).and_then(|n| n.to_str()))
			.flatten();
		bundle_dir
			.or_else(|| rel.file_stem().and_then(|s| s.to_str()))
			.unwrap_or_default()
			.to_string()
	}

	/// Copies the post image next to the other public assets. `None` when
	/// there is no usable image.
	/// Site-absolute paths (`/cover.png`) still resolve next to the post.
	fn publish_image(&self, path: &Path, id: &str, image: &str) -> Option<String> {
		let image = image.trim_start_matches(['/', '\\']);
		let source = path.parent().unwrap_or(Path::new("")).join(image);
		if !source.is_file() {
			warn!("{}: image {} not found", path.display(), source.display());
			return None;
		}
		let ext = Path::new(image)
			.extension()
			.and_then(|e| e.to_str())
			.map(|e| format!(".{e}"))
			.unwrap_or_default();
		let file_name = format!("{id}{ext}");
		if !self.config.dry_run {
			let target = self.config.public_dir.join(&file_name);
			let copied = fs::create_dir_all(&self.config.public_dir).and_then(|_| fs::copy(&source, &target));
			if let Err(e) = copied {
				warn!("{}: copying image to {} failed: {e}", path.display(), target.display());
				return None;
			}
		}
		Some(format!("{}/{file_name}", self.config.public_prefix.trim_end_matches('/')))
	}

	fn ingest_file(&self, path: &Path, category: &str, rel: &Path) -> Result<Outcome> {
		let raw = fs::read_to_string(path).map_err(IngestError::io(path))?;
		let (front, body) = front_matter::parse(path, &raw)?;
		if front.draft {
			return Ok(Outcome::Draft);
		}

		let slug = Self::slug(rel, &front);
		let id = text::node_id(category, &slug);
		let title = front.title.clone().filter(|t| !t.trim().is_empty()).unwrap_or(slug);
		let desc = front
			.description
			.clone()
			.filter(|d| !d.trim().is_empty())
			.unwrap_or_else(|| text::excerpt(body));
		let img = front
			.image
			.as_deref()
			.filter(|i| !i.trim().is_empty())
			.and_then(|image| self.publish_image(path, &id, image));

		Ok(Outcome::Published(Entry {
			id,
			category: category.to_string(),
			title,
			desc,
			img,
			date: front.date,
			tags: front.tags.unwrap_or_else(|| vec![category.to_string()]),
			body: self.cleaner.clean(body),
		}))
	}
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
	let mut json = serde_json::to_string_pretty(value).map_err(|source| IngestError::Json {
		path: path.to_path_buf(),
		source,
	})?;
	json.push('\n');
	fs::write(path, json).map_err(IngestError::io(path))
}

/// Runs the whole job. Per-file problems are logged and counted in
/// [`Summary::skipped`]; only setup and output failures are errors.
pub fn run(config: &IngestConfig) -> Result<Summary> {
	let ingester = Ingester {
		config,
		cleaner: ShortcodeCleaner::new()?,
	};
	let root = &config.source_dir;
	if !root.is_dir() {
		return Err(IngestError::Io {
			path: root.clone(),
			source: std::io::Error::new(std::io::ErrorKind::NotFound, "source directory not found"),
		});
	}
	info!("Ingesting {}", root.display());

	let mut builder = GraphBuilder::default();
	let mut skipped = 0;
	for entry in WalkDir::new(root).sort_by_file_name() {
		let entry = match entry {
			Ok(entry) => entry,
			Err(source) => {
				warn!(
					"{}",
					IngestError::Walk {
						root: root.clone(),
						source
					}
				);
				skipped += 1;
				continue;
			}
		};
		let path = entry.path();
		let is_markdown = path.extension().is_some_and(|e| e == "md");
		if !entry.file_type().is_file() || !is_markdown || entry.file_name() == "_index.md" {
			continue;
		}
		let Ok(rel) = path.strip_prefix(root) else {
			continue;
		};
		let mut parts = rel.components();
		let category = match (parts.next(), parts.next()) {
			(Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
			_ => {
				debug!("{}: not in a category directory", path.display());
				continue;
			}
		};

		match ingester.ingest_file(path, &category, rel) {
			Ok(Outcome::Published(post)) => {
				debug!("{} -> {}", rel.display(), post.id);
				builder.add(post);
			}
			Ok(Outcome::Draft) => {
				debug!("{}: draft", path.display());
				skipped += 1;
			}
			Err(e) => {
				warn!("Skipping {e}");
				skipped += 1;
			}
		}
	}

	let categories = builder.categories().to_vec();
	let (graph, content) = builder.finish(&config.me_name, &config.me_desc);
	let violations = validate(&graph, &categories);
	for violation in &violations {
		warn!("Hierarchy: {violation}");
	}

	if config.dry_run {
		info!("Dry run: nothing written");
	} else {
		fs::create_dir_all(&config.data_dir).map_err(IngestError::io(&config.data_dir))?;
		write_json(&config.data_dir.join("graph.json"), &graph)?;
		write_json(&config.data_dir.join("content.json"), &content)?;
	}

	let summary = Summary {
		nodes: graph.nodes.len(),
		links: graph.links.len(),
		skipped,
		violations,
	};
	info!(
		"Ingestion complete: {} nodes, {} links, {} skipped",
		summary.nodes, summary.links, summary.skipped
	);
	Ok(summary)
}
