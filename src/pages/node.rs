use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_params_map;
use phosphor_leptos::{ARROW_LEFT, CALENDAR, Icon, TAG};

use crate::components::markdown::Markdown;
use crate::data::{NodeContent, use_knowledge_base};

#[component]
fn NodeMissing() -> impl IntoView {
	view! {
		<div class="node-missing">
			<h1>"404"</h1>
			<p>"Node not found in the neural network."</p>
			<A href="/" attr:class="pill-link">"Return to Graph"</A>
		</div>
	}
}

#[component]
fn NodeArticle(content: NodeContent) -> impl IntoView {
	let date = content.date.map(|date| {
		view! {
			<span class="meta-chip">
				<Icon icon=CALENDAR size="16px" />
				{date}
			</span>
		}
	});
	let tags = content
		.tags
		.unwrap_or_default()
		.into_iter()
		.map(|tag| {
			view! {
				<span class="meta-chip tag">
					<Icon icon=TAG size="12px" />
					{tag}
				</span>
			}
		})
		.collect_view();

	view! {
		<div class="node-page">
			<nav class="node-nav">
				<A href="/" attr:class="back-link">
					<Icon icon=ARROW_LEFT size="20px" />
					<span>"Back to Graph"</span>
				</A>
			</nav>
			<main class="node-main">
				<header>
					<div class="node-meta">{date} {tags}</div>
					<h1 class="node-title">{content.title}</h1>
				</header>
				<Markdown content=content.content />
			</main>
		</div>
	}
}

/// Full content page for `/node/:id`.
#[component]
pub fn NodePage() -> impl IntoView {
	let kb = use_knowledge_base();
	let params = use_params_map();

	move || {
		let id = params.with(|p| p.get("id")).unwrap_or_default();
		match kb.get_content(&id) {
			Some(content) => view! { <NodeArticle content=content /> }.into_any(),
			None => {
				log::warn!("No node `{id}`");
				view! { <NodeMissing /> }.into_any()
			}
		}
	}
}
