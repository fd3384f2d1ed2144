use leptos::prelude::*;
use leptos_router::components::A;

/// Fallback for unknown routes.
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="node-missing">
			<h1>"Page not found"</h1>
			<A href="/" attr:class="pill-link">"Return to Graph"</A>
		</div>
	}
}
