//! YAML front matter between `---` fences at the top of a markdown file.

use std::path::Path;

use serde::Deserialize;

use super::error::{IngestError, Result};

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
	pub title: Option<String>,
	pub description: Option<String>,
	pub date: Option<String>,
	pub tags: Option<Vec<String>>,
	pub image: Option<String>,
	pub slug: Option<String>,
	pub draft: bool,
}

/// `Some((yaml, body))` when the text opens with a fence, `None` when it has
/// no front matter at all. `Err(())` for an opening fence that never closes.
fn split(raw: &str) -> Result<Option<(&str, &str)>, ()> {
	let Some(rest) = raw.strip_prefix("---") else {
		return Ok(None);
	};
	let Some(rest) = rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')) else {
		// a thematic break like `----` is body text
		return Ok(None);
	};
	let mut offset = 0;
	for line in rest.split_inclusive('\n') {
		if line.trim_end() == "---" {
			return Ok(Some((&rest[..offset], &rest[offset + line.len()..])));
		}
		offset += line.len();
	}
	Err(())
}

/// Splits a document into its front matter and markdown body.
pub fn parse<'a>(path: &Path, raw: &'a str) -> Result<(FrontMatter, &'a str)> {
	let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);
	match split(raw) {
		Ok(None) => Ok((FrontMatter::default(), raw)),
		Ok(Some((yaml, body))) if yaml.trim().is_empty() => Ok((FrontMatter::default(), body)),
		Ok(Some((yaml, body))) => {
			let front = serde_yaml::from_str(yaml).map_err(|source| IngestError::FrontMatter {
				path: path.to_path_buf(),
				source,
			})?;
			Ok((front, body))
		}
		Err(()) => Err(IngestError::UnterminatedFrontMatter {
			path: path.to_path_buf(),
		}),
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	fn parse_str(raw: &str) -> Result<(FrontMatter, &str)> {
		parse(Path::new("post.md"), raw)
	}

	#[test]
	fn reads_fields_and_body() {
		let raw = "---\ntitle: Dune\ndate: 2023-05-01\ntags: [scifi, classics]\nimage: cover.jpg\ndraft: false\n---\n\nSpice.\n";
		let (front, body) = parse_str(raw).unwrap();
		assert_eq!(
			front,
			FrontMatter {
				title: Some("Dune".into()),
				date: Some("2023-05-01".into()),
				tags: Some(vec!["scifi".into(), "classics".into()]),
				image: Some("cover.jpg".into()),
				..FrontMatter::default()
			}
		);
		assert_eq!(body, "\nSpice.\n");
	}

	#[test]
	fn documents_without_front_matter_are_all_body() {
		let (front, body) = parse_str("# Hello\n").unwrap();
		assert_eq!(front, FrontMatter::default());
		assert_eq!(body, "# Hello\n");

		let (_, body) = parse_str("----\nrule\n").unwrap();
		assert_eq!(body, "----\nrule\n");
	}

	#[test]
	fn empty_and_crlf_front_matter() {
		let (front, body) = parse_str("---\n---\nbody").unwrap();
		assert_eq!(front, FrontMatter::default());
		assert_eq!(body, "body");

		let (front, body) = parse_str("---\r\ndraft: true\r\n---\r\nbody").unwrap();
		assert!(front.draft);
		assert_eq!(body, "body");
	}

	#[test]
	fn broken_front_matter_is_an_error() {
		assert!(matches!(
			parse_str("---\ntitle: x\n"),
			Err(IngestError::UnterminatedFrontMatter { .. })
		));
		assert!(matches!(
			parse_str("---\ntags: [unclosed\n---\n"),
			Err(IngestError::FrontMatter { .. })
		));
	}
}
