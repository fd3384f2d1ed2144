use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{error, info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::interaction::SelectionBridge;
use super::render::Renderer;
use super::state::GraphScene;
use super::theme::SceneConfig;
use crate::data::GraphData;
use crate::error::{Error, Result};

const ZOOM_STEP: f32 = 1.1;

fn window_size(window: &Window) -> Result<(f64, f64)> {
	let dim = |v: std::result::Result<JsValue, JsValue>| -> Result<f64> {
		v?.as_f64()
			.ok_or_else(|| Error::Browser("window size is not a number".into()))
	};
	Ok((dim(window.inner_width())?, dim(window.inner_height())?))
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

type Shared<T> = Rc<RefCell<Option<T>>>;
type FrameCallback = Shared<Closure<dyn FnMut(f64)>>;

/// Releases everything the animation loop keeps alive. Runs from inside the
/// frame callback, so the callback's own closure is freed once it returns.
fn release(
	window: &Window,
	scene: &Shared<GraphScene>,
	renderer: &Shared<Renderer>,
	resize: &Shared<Closure<dyn FnMut()>>,
	animate: &FrameCallback,
) {
	if let Some(cb) = resize.borrow_mut().take() {
		let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	}
	clear_loop(scene, renderer, animate);
	info!("Scene released");
}

/// Empties the slots the frame loop shares. The frame callback holds a
/// handle to its own slot, so taking it out is what breaks the cycle.
fn clear_loop<S, R, F>(scene: &Shared<S>, renderer: &Shared<R>, animate: &Shared<F>) {
	scene.borrow_mut().take();
	renderer.borrow_mut().take();
	animate.borrow_mut().take();
}

/// Full-window 3D rendering of the knowledge graph. Clicking a node flies
/// the camera to it and selects it through `selection`; clicking empty
/// space clears the selection.
#[component]
pub fn KnowledgeGraph(
	graph: GraphData,
	selection: SelectionBridge,
	#[prop(optional)] config: SceneConfig,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let scene: Shared<GraphScene> = Rc::new(RefCell::new(None));
	let renderer: Shared<Renderer> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let resize_cb: Shared<Closure<dyn FnMut()>> = Rc::new(RefCell::new(None));
	let alive = Arc::new(AtomicBool::new(true));
	let (cursor, set_cursor) = signal("grab");
	let (scene_init, renderer_init, animate_init, resize_init, alive_init) = (
		scene.clone(),
		renderer,
		animate,
		resize_cb,
		alive.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if scene_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let setup = || -> Result<Renderer> {
			let window = web_sys::window().ok_or_else(|| Error::Browser("no window".into()))?;
			let (w, h) = window_size(&window)?;
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let graph_scene = GraphScene::new(&graph, w, h, config.clone());
			for texture in graph_scene.textures() {
				if let Err(e) = texture.load() {
					warn!("Texture load could not start: {e}");
				}
			}
			*scene_init.borrow_mut() = Some(graph_scene);

			let (scene_resize, canvas_resize) = (scene_init.clone(), canvas.clone());
			*resize_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				match window_size(&win) {
					Ok((nw, nh)) => {
						canvas_resize.set_width(nw as u32);
						canvas_resize.set_height(nh as u32);
						if let Some(ref mut s) = *scene_resize.borrow_mut() {
							s.resize(nw, nh);
						}
					}
					Err(e) => warn!("Resize ignored: {e}"),
				}
			}));
			if let Some(ref cb) = *resize_init.borrow() {
				window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref())?;
			}
			Renderer::new(&canvas)
		};
		match setup() {
			Ok(r) => *renderer_init.borrow_mut() = Some(r),
			Err(e) => {
				error!("Knowledge graph unavailable: {e}");
				if let Some(window) = web_sys::window() {
					release(&window, &scene_init, &renderer_init, &resize_init, &animate_init);
				}
				return;
			}
		}
		info!("Scene ready: {} nodes, {} links", graph.nodes.len(), graph.links.len());

		let (scene_anim, renderer_anim, animate_inner, resize_anim, alive_anim) = (
			scene_init.clone(),
			renderer_init.clone(),
			animate_init.clone(),
			resize_init.clone(),
			alive_init.clone(),
		);
		let mut frame_failed = false;
		*animate_init.borrow_mut() = Some(Closure::new(move |now: f64| {
			let Some(window) = web_sys::window() else {
				return;
			};
			if !alive_anim.load(Ordering::Relaxed) {
				release(&window, &scene_anim, &renderer_anim, &resize_anim, &animate_inner);
				return;
			}
			let (mut scene, mut renderer) = (scene_anim.borrow_mut(), renderer_anim.borrow_mut());
			if let (Some(s), Some(r)) = (scene.as_mut(), renderer.as_mut()) {
				s.tick(now);
				if let Err(e) = r.render(s) {
					// log once, not sixty times a second
					if !frame_failed {
						error!("Frame failed: {e}");
						frame_failed = true;
					}
				}
			}
			drop((scene, renderer));
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let (Some(window), Some(cb)) = (web_sys::window(), animate_init.borrow().as_ref()) {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	on_cleanup(move || alive.store(false, Ordering::Relaxed));

	let scene_md = scene.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *scene_md.borrow_mut() {
			s.drag.begin(x, y);
		}
	};

	let scene_mm = scene.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *scene_mm.borrow_mut() {
			if s.drag.active {
				let (dx, dy) = s.drag.advance(x, y);
				s.camera.orbit(dx, dy);
				return;
			}
			let hovered = s.node_at_position(x, y);
			if hovered != s.hover {
				s.set_hover(hovered);
				set_cursor.set(if hovered.is_some() { "pointer" } else { "grab" });
			}
		}
	};

	let scene_mu = scene.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};
		let mut guard = scene_mu.borrow_mut();
		let Some(s) = guard.as_mut() else {
			return;
		};
		if !s.drag.finish() {
			return;
		}
		match s.node_at_position(x, y) {
			Some(idx) => {
				let (id, position) = (s.nodes[idx].id.clone(), s.position(idx));
				selection.node_click(&id, position, &mut s.camera);
			}
			None => selection.background_click(),
		}
	};

	let scene_ml = scene.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *scene_ml.borrow_mut() {
			s.drag.finish();
			s.set_hover(None);
		}
		set_cursor.set("grab");
	};

	let scene_wh = scene;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		if let Some(ref mut s) = *scene_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
			s.camera.dolly(factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="knowledge-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style:cursor=move || cursor.get()
		/>
	}
}

#[cfg(test)]
mod tests {
	use std::rc::Weak;

	use super::*;

	struct Marker;

	#[test]
	fn clearing_the_loop_frees_a_self_referencing_callback() {
		let scene: Shared<Rc<Marker>> = Rc::new(RefCell::new(None));
		let renderer: Shared<Rc<Marker>> = Rc::new(RefCell::new(None));
		let animate: Shared<Box<dyn Fn()>> = Rc::new(RefCell::new(None));

		let held = Rc::new(Marker);
		let watched: Weak<Marker> = Rc::downgrade(&held);
		*scene.borrow_mut() = Some(held);
		*renderer.borrow_mut() = Some(Rc::new(Marker));
		let (scene_cb, animate_cb) = (scene.clone(), animate.clone());
		*animate.borrow_mut() = Some(Box::new(move || {
			let _ = (scene_cb.borrow().is_some(), animate_cb.borrow().is_some());
		}));
		let callback_handle = Rc::downgrade(&animate);
		assert_eq!(Rc::strong_count(&animate), 2);

		clear_loop(&scene, &renderer, &animate);
		assert!(watched.upgrade().is_none());
		assert!(renderer.borrow().is_none());
		assert_eq!(Rc::strong_count(&animate), 1);
		drop(animate);
		assert!(callback_handle.upgrade().is_none());
	}
}
