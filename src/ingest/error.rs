use std::path::PathBuf;

/// Failures of the offline ingestion job. Per-file variants are logged and
/// the file skipped; the rest abort the run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
	/// Reading a post, copying an image or writing output failed.
	#[error("{}: {source}", path.display())]
	Io {
		/// File or directory involved.
		path: PathBuf,
		/// Underlying failure.
		#[source]
		source: std::io::Error,
	},
	/// The YAML between the fences does not parse.
	#[error("{}: invalid front matter: {source}", path.display())]
	FrontMatter {
		/// The post.
		path: PathBuf,
		/// Parser error.
		#[source]
		source: serde_yaml::Error,
	},
	/// An opening `---` without a closing one.
	#[error("{}: front matter is never closed", path.display())]
	UnterminatedFrontMatter {
		/// The post.
		path: PathBuf,
	},
	/// A directory entry could not be read.
	#[error("walking {}: {source}", root.display())]
	Walk {
		/// The source tree being walked.
		root: PathBuf,
		/// Underlying failure.
		#[source]
		source: walkdir::Error,
	},
	/// Serializing an output file failed.
	#[error("writing {}: {source}", path.display())]
	Json {
		/// Output file.
		path: PathBuf,
		/// Serializer error.
		#[source]
		source: serde_json::Error,
	},
	/// A built-in shortcode regex failed to compile.
	#[error("bad shortcode pattern: {0}")]
	Pattern(#[from] regex::Error),
}

impl IngestError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| IngestError::Io { path, source }
	}
}

/// Result of an ingestion step.
pub type Result<T, E = IngestError> = std::result::Result<T, E>;
