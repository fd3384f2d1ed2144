use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::detail_overlay::DetailOverlay;
use crate::components::knowledge_graph::{
	InteractionController, KnowledgeGraph, SceneConfig, SelectionBridge, ThemePreset,
};
use crate::data::use_knowledge_base;

/// The graph view with the selected node's overlay on top.
#[component]
pub fn Home() -> impl IntoView {
	let kb = use_knowledge_base();
	let query = use_query_map();
	let theme = query.with_untracked(|q| {
		q.get("theme")
			.map(|name| ThemePreset::from_name(&name))
			.unwrap_or_default()
	});
	let config = SceneConfig::with_theme(theme);

	let selection = SelectionBridge::new(InteractionController::new(
		config.standoff_distance,
		config.transition_ms,
	));
	let on_close = Callback::new(move |_| selection.close());
	let owner = kb.node("me").map(|me| me.name.to_uppercase());

	view! {
		<main class="fullscreen-graph">
			<header class="graph-header">
				{owner.map(|name| view! { <h1>{name}</h1> })}
				<p class="subtitle">"Digital Garden & Knowledge Graph"</p>
			</header>

			<KnowledgeGraph graph=kb.graph().clone() selection=selection config=config />
			<DetailOverlay selected=selection.selected() on_close=on_close />

			<p class="nav-hint">"Navigate: Drag to rotate, Scroll to zoom, Click nodes to explore"</p>
		</main>
	}
}
