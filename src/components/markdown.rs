use leptos::prelude::*;
use pulldown_cmark::{Options, Parser, html};

/// Renders GitHub-flavoured markdown (tables, strikethrough, task lists) to HTML.
pub fn render_markdown(content: &str) -> String {
	let mut options = Options::empty();
	options.insert(Options::ENABLE_STRIKETHROUGH);
	options.insert(Options::ENABLE_TABLES);
	options.insert(Options::ENABLE_TASKLISTS);

	let parser = Parser::new_ext(content, options);
	let mut html_output = String::new();
	html::push_html(&mut html_output, parser);
	html_output
}

/// Node body text. Styling lives under `.markdown-content` in the stylesheet.
#[component]
pub fn Markdown(#[prop(into)] content: String) -> impl IntoView {
	view! { <article class="markdown-content" inner_html=render_markdown(&content) /> }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn renders_gfm_extensions() {
		let html = render_markdown("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~old~~\n\n- [x] done\n- [ ] todo\n");
		assert!(html.contains("<table>"));
		assert!(html.contains("<del>old</del>"));
		assert_eq!(html.matches(r#"type="checkbox""#).count(), 2);
		assert_eq!(html.matches(r#"checked="""#).count(), 1);
	}

	#[test]
	fn renders_headings_and_code() {
		let html = render_markdown("# Dune\n\n```rust\nfn main() {}\n```\n");
		assert!(html.contains("<h1>Dune</h1>"));
		assert!(html.contains(r#"<code class="language-rust">"#));
	}
}
