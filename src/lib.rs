//! Leptos client-side app wiring and routes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// getrandom needs its `js` feature to seed rand in the browser
#[cfg(target_arch = "wasm32")]
use getrandom as _;

// Modules
mod components;
mod data;
mod error;
mod pages;

#[cfg(not(target_arch = "wasm32"))]
pub mod ingest;

pub use data::{GraphData, GraphLink, GraphNode, KnowledgeBase, NodeContent, NodeKind};
pub use error::{Error, Result};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::node::NodePage;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// An app router which renders the graph, node pages and handles 404's
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();
	data::provide_knowledge_base();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />

		// sets the document title
		<Title text="Digital Garden & Knowledge Graph" />

		// injects metadata in the <head> of the page
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
				<Route path=path!("/node/:id") view=NodePage />
			</Routes>
		</Router>
	}
}
