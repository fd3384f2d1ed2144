use glam::Vec3;
use log::debug;
use rand::Rng;

use crate::data::GraphData;

use super::camera::{Camera, CameraController};
use super::compositor::SceneCompositor;
use super::layout::{ForceLayout, LayoutEngine, LayoutParameters};
use super::texture::Texture;
use super::theme::SceneConfig;
use super::visuals::{self, NodeShape, NodeVisual};

/// Smallest clickable radius on screen, in pixels.
pub const MIN_HIT_PX: f64 = 6.0;
/// Pointer travel below which a press/release counts as a click.
pub const CLICK_TOLERANCE_PX: f64 = 4.0;

pub struct SceneNode {
	pub id: String,
	pub name: String,
	pub visual: NodeVisual,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub last_x: f64,
	pub last_y: f64,
}

impl DragState {
	pub fn begin(&mut self, x: f64, y: f64) {
		*self = DragState {
			active: true,
			moved: false,
			start_x: x,
			start_y: y,
			last_x: x,
			last_y: y,
		};
	}

	/// Records a pointer move and returns the delta since the previous one.
	pub fn advance(&mut self, x: f64, y: f64) -> (f64, f64) {
		let delta = (x - self.last_x, y - self.last_y);
		(self.last_x, self.last_y) = (x, y);
		if (x - self.start_x).hypot(y - self.start_y) > CLICK_TOLERANCE_PX {
			self.moved = true;
		}
		delta
	}

	/// Ends the gesture; `true` when it was a click rather than a drag.
	pub fn finish(&mut self) -> bool {
		let was_click = self.active && !self.moved;
		self.active = false;
		was_click
	}
}

pub struct GraphScene {
	pub nodes: Vec<SceneNode>,
	pub links: Vec<(usize, usize)>,
	pub layout: Box<dyn LayoutEngine>,
	pub camera: CameraController,
	pub compositor: SceneCompositor,
	pub config: SceneConfig,
	pub drag: DragState,
	pub hover: Option<usize>,
	pub width: f64,
	pub height: f64,
	/// Seconds of animation time, drives link particles.
	pub flow_time: f64,
	last_frame_ms: Option<f64>,
}

impl GraphScene {
	pub fn new(data: &GraphData, width: f64, height: f64, config: SceneConfig) -> Self {
		Self::with_rng(data, width, height, config, &mut rand::thread_rng())
	}

	pub fn with_rng<R: Rng>(data: &GraphData, width: f64, height: f64, config: SceneConfig, rng: &mut R) -> Self {
		let nodes: Vec<SceneNode> = data
			.nodes
			.iter()
			.map(|node| SceneNode {
				id: node.id.clone(),
				name: node.name.clone(),
				visual: visuals::resolve(node, &config),
			})
			.collect();
		let links = data.drawable_links();
		let layout = ForceLayout::new(nodes.len(), &links, LayoutParameters::default());

		let distance = CameraController::initial_distance(nodes.len());
		let camera = CameraController::new(Camera::new(
			Vec3::new(0.0, 0.0, distance),
			Vec3::ZERO,
			config.fov_degrees,
		));

		Self {
			compositor: SceneCompositor::new(&config, rng),
			nodes,
			links,
			layout: Box::new(layout),
			camera,
			config,
			drag: DragState::default(),
			hover: None,
			width,
			height,
			flow_time: 0.0,
			last_frame_ms: None,
		}
	}

	/// Image textures that still need fetching.
	pub fn textures(&self) -> impl Iterator<Item = &Texture> {
		self.nodes.iter().filter_map(|n| n.visual.texture.as_ref())
	}

	pub fn position(&self, index: usize) -> Vec3 {
		self.layout.position(index)
	}

	/// One frame of simulation: layout first, then the camera, so the draw
	/// that follows sees this frame's positions.
	pub fn tick(&mut self, now_ms: f64) {
		let dt = self
			.last_frame_ms
			.map(|last| (now_ms - last).clamp(0.0, 100.0) / 1000.0)
			.unwrap_or(0.0);
		self.last_frame_ms = Some(now_ms);

		if !self.layout.is_settled() {
			self.layout.step();
			if self.layout.is_settled() {
				debug!("Layout settled");
			}
		}
		self.camera.update(now_ms);
		self.flow_time += dt;
	}

	/// World radius of the clickable body of a node.
	pub fn hit_radius(&self, visual: &NodeVisual) -> f32 {
		match visual.shape {
			// the glow is mostly transparent; only its core is clickable
			NodeShape::GlowSprite => visual.radius / self.config.glow_scale,
			_ => visual.radius,
		}
	}

	/// The node under a canvas point, preferring the one closest to the camera.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let view = self.camera.camera.view();
		let mut found: Option<(usize, f32)> = None;
		for (idx, node) in self.nodes.iter().enumerate() {
			let Some(p) = self
				.camera
				.camera
				.project_with(&view, self.position(idx), self.width, self.height)
			else {
				continue;
			};
			let r = (self.hit_radius(&node.visual) as f64 * p.scale).max(MIN_HIT_PX);
			if (p.x - sx).hypot(p.y - sy) <= r && found.is_none_or(|(_, depth)| p.depth < depth) {
				found = Some((idx, p.depth));
			}
		}
		found.map(|(idx, _)| idx)
	}

	pub fn set_hover(&mut self, node: Option<usize>) {
		self.hover = node;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::data::{GraphLink, GraphNode};

	fn node(id: &str, kind: &str, val: f64) -> GraphNode {
		GraphNode {
			id: id.into(),
			name: id.into(),
			kind: kind.into(),
			val,
			desc: None,
			img: None,
			link: None,
		}
	}

	fn scene() -> GraphScene {
		let data = GraphData {
			nodes: vec![
				node("me", "me", 30.0),
				node("cat-books", "book", 20.0),
				node("books-dune", "book", 10.0),
				node("thought-x", "thought", 10.0),
			],
			links: vec![
				GraphLink {
					source: "me".into(),
					target: "cat-books".into(),
				},
				GraphLink {
					source: "cat-books".into(),
					target: "books-dune".into(),
				},
				GraphLink {
					source: "cat-books".into(),
					target: "missing".into(),
				},
			],
		};
		GraphScene::with_rng(&data, 800.0, 600.0, SceneConfig::default(), &mut StdRng::seed_from_u64(3))
	}

	#[test]
	fn builds_one_visual_per_node_and_skips_dangling_links() {
		let s = scene();
		assert_eq!(s.nodes.len(), 4);
		assert_eq!(s.links, vec![(0, 1), (1, 2)]);
		assert_eq!(s.nodes[3].visual.shape, NodeShape::GlowSprite);
		assert_eq!(s.textures().count(), 0);
	}

	#[test]
	fn picks_the_node_under_the_pointer() {
		let mut s = scene();
		for t in 0..30 {
			s.tick(t as f64 * 16.0);
		}
		let p = s
			.camera
			.camera
			.project(s.position(2), s.width, s.height)
			.unwrap();
		let hit = s.node_at_position(p.x, p.y).unwrap();
		// a nearer node may overlap, but whatever is hit sits under the pointer
		let q = s.camera.camera.project(s.position(hit), s.width, s.height).unwrap();
		assert!(q.depth <= p.depth);
		assert_eq!(s.node_at_position(-500.0, -500.0), None);
	}

	#[test]
	fn ticks_advance_flow_time_with_clamped_steps() {
		let mut s = scene();
		s.tick(0.0);
		s.tick(16.0);
		assert!((s.flow_time - 0.016).abs() < 1e-9);
		s.tick(10_000.0);
		assert!((s.flow_time - 0.116).abs() < 1e-9);
	}

	#[test]
	fn drag_distinguishes_clicks() {
		let mut drag = DragState::default();
		drag.begin(10.0, 10.0);
		drag.advance(11.0, 12.0);
		assert!(drag.finish());

		drag.begin(10.0, 10.0);
		assert_eq!(drag.advance(30.0, 10.0), (20.0, 0.0));
		assert!(!drag.finish());
		assert!(!drag.finish());
	}
}
