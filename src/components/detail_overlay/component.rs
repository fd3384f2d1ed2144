use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use leptos_router::components::A;
use phosphor_leptos::{ARROW_SQUARE_OUT, BOOK_OPEN, BRAIN, BRIEFCASE, CODE, HEART, Icon, NEWSPAPER, X};

use super::state::{OverlayState, PrimaryAction, TRANSITION_MS};
use crate::components::knowledge_graph::node_color;
use crate::data::{GraphNode, NodeKind, use_knowledge_base};

#[component]
fn KindIcon(kind: NodeKind) -> impl IntoView {
	let color = format!("color: {};", node_color(&kind).css());
	let icon = match kind {
		NodeKind::Me | NodeKind::Passion => view! { <Icon icon=HEART size="24px" /> }.into_any(),
		NodeKind::Book => view! { <Icon icon=BOOK_OPEN size="24px" /> }.into_any(),
		NodeKind::Project | NodeKind::TechProject => view! { <Icon icon=CODE size="24px" /> }.into_any(),
		NodeKind::Thought => view! { <Icon icon=BRAIN size="24px" /> }.into_any(),
		NodeKind::Experience => view! { <Icon icon=BRIEFCASE size="24px" /> }.into_any(),
		NodeKind::Publication => view! { <Icon icon=NEWSPAPER size="24px" /> }.into_any(),
		NodeKind::Other(_) => view! { <span class="kind-dot" /> }.into_any(),
	};
	view! { <span class="kind-icon" style=color>{icon}</span> }
}

#[component]
fn ActionButton(action: PrimaryAction) -> impl IntoView {
	let (href, label) = (action.href(), action.label());
	if action.is_external() {
		view! {
			<a class="overlay-action" href=href target="_blank" rel="noopener noreferrer">
				<span>{label}</span>
				<Icon icon=ARROW_SQUARE_OUT size="16px" />
			</a>
		}
		.into_any()
	} else {
		let icon = match action {
			PrimaryAction::ReadMore(_) => view! { <Icon icon=BOOK_OPEN size="16px" /> }.into_any(),
			_ => view! { <Icon icon=ARROW_SQUARE_OUT size="16px" /> }.into_any(),
		};
		view! {
			<A href=href attr:class="overlay-action">
				<span>{label}</span>
				{icon}
			</A>
		}
		.into_any()
	}
}

fn overlay_body(node: GraphNode) -> impl IntoView {
	let action = PrimaryAction::for_node(&node);
	let desc = node
		.desc
		.clone()
		.unwrap_or_else(|| "No description available for this node yet.".to_string());
	let image = node.img.clone().map(|src| {
		view! {
			<div class="overlay-image">
				<img src=src alt=node.name.clone() />
			</div>
		}
	});

	view! {
		<div class="overlay-body">
			<div class="overlay-kind">
				<KindIcon kind=node.kind.clone() />
				<span class="overlay-kind-label">{node.kind.label()}</span>
			</div>
			<h2 class="overlay-title">{node.name.clone()}</h2>
			{image}
			<p class="overlay-desc">{desc}</p>
			<ActionButton action=action />
		</div>
	}
}

/// Slide-in panel describing the selected node. `selected` is read-only here;
/// closing goes back through `on_close` so the selection owner stays the only
/// writer.
#[component]
pub fn DetailOverlay(#[prop(into)] selected: Signal<Option<String>>, on_close: Callback<()>) -> impl IntoView {
	let kb = use_knowledge_base();
	let overlay = RwSignal::new(OverlayState::default());

	Effect::new(move |_| {
		let node = selected.get().and_then(|id| kb.node(&id).cloned());
		let Some(generation) = overlay.try_update(|o| o.select(node)).flatten() else {
			return;
		};
		Timeout::new(TRANSITION_MS, move || {
			overlay.try_update(|o| o.settle(generation));
		})
		.forget();
	});

	// body only rebuilds when the node changes, not on every phase step
	let shown = Memo::new(move |_| overlay.with(|o| o.node().cloned()));
	let class = move || format!("detail-overlay {}", overlay.with(|o| o.phase().class()));

	view! {
		<Show when=move || overlay.with(OverlayState::is_visible)>
			<aside class=class>
				<button class="overlay-close" aria-label="Close" on:click=move |_| on_close.run(())>
					<Icon icon=X size="24px" />
				</button>
				{move || shown.get().map(overlay_body)}
			</aside>
		</Show>
	}
}
