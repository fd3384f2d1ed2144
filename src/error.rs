//! Error type shared by the data store and the browser glue.

use wasm_bindgen::JsValue;

/// Errors raised while loading data or talking to the browser.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The embedded graph or content file is not valid JSON for its schema.
	#[error("failed to parse {file}: {source}")]
	Data {
		/// Which embedded file.
		file: &'static str,
		/// What serde rejected.
		#[source]
		source: serde_json::Error,
	},
	/// A browser API call failed or returned something unexpected.
	#[error("browser api: {0}")]
	Browser(String),
}

impl From<JsValue> for Error {
	fn from(value: JsValue) -> Self {
		Error::Browser(
			value
				.as_string()
				.unwrap_or_else(|| format!("{value:?}")),
		)
	}
}

/// Shorthand used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
