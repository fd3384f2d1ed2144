//! Node visual resolution: which 3D object and which color a node gets.
//!
//! Resolution happens once per node when the scene is built.

use crate::data::{GraphNode, NodeKind};

use super::texture::Texture;
use super::theme::SceneConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
	pub const fn hex(value: u32) -> Self {
		Rgb(
			((value >> 16) & 0xff) as u8,
			((value >> 8) & 0xff) as u8,
			(value & 0xff) as u8,
		)
	}

	pub fn css(self) -> String {
		format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
	}

	pub fn rgba(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.0, self.1, self.2, alpha.clamp(0.0, 1.0))
	}

	/// Multiplies every channel, saturating at white.
	pub fn scale(self, factor: f32) -> Rgb {
		let f = |c: u8| (c as f32 * factor.max(0.0)).round().min(255.0) as u8;
		Rgb(f(self.0), f(self.1), f(self.2))
	}

	/// Linear blend towards `other`; `t = 0` is `self`.
	pub fn mix(self, other: Rgb, t: f32) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let f = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
		Rgb(f(self.0, other.0), f(self.1, other.1), f(self.2, other.2))
	}

	/// Relative luminance in `0..1`.
	#[cfg(test)]
	pub fn luminance(self) -> f32 {
		(0.2126 * self.0 as f32 + 0.7152 * self.1 as f32 + 0.0722 * self.2 as f32) / 255.0
	}
}

pub const DEFAULT_COLOR: Rgb = Rgb::hex(0xcccccc);
pub const WHITE: Rgb = Rgb::hex(0xffffff);

pub fn node_color(kind: &NodeKind) -> Rgb {
	match kind {
		NodeKind::Me => Rgb::hex(0xff0055),
		NodeKind::Passion => Rgb::hex(0xff9900),
		NodeKind::Book => Rgb::hex(0x00ccff),
		NodeKind::Project => Rgb::hex(0x00ff99),
		NodeKind::TechProject => Rgb::hex(0xaa00ff),
		NodeKind::Thought => Rgb::hex(0xffff00),
		NodeKind::Experience => Rgb::hex(0xff66cc),
		NodeKind::Publication => Rgb::hex(0xffffff),
		NodeKind::Other(_) => DEFAULT_COLOR,
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blending {
	Normal,
	Additive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	/// Camera-facing soft glow, drawn additively.
	GlowSprite,
	/// Translucent refractive ball.
	GlassSphere,
	/// Opaque ball, flat shaded or image mapped.
	SolidSphere,
}

/// Physically based material parameters, in the usual `0..1` ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
	pub color: Rgb,
	pub roughness: f32,
	pub metalness: f32,
	pub clearcoat: f32,
	pub transmission: f32,
	pub opacity: f32,
	pub blending: Blending,
	pub depth_write: bool,
}

#[derive(Clone)]
pub struct NodeVisual {
	pub shape: NodeShape,
	pub color: Rgb,
	pub material: Material,
	/// World-space radius. For sprites this is half the sprite width.
	pub radius: f32,
	pub texture: Option<Texture>,
}

impl NodeVisual {
	/// Whether the surface currently shows the node image.
	pub fn is_textured(&self) -> bool {
		self.texture.as_ref().is_some_and(Texture::is_ready)
	}
}

pub fn sphere_radius(val: f64, rel_size: f32) -> f32 {
	((val.max(0.0) as f32).cbrt() * rel_size).max(1.0)
}

pub fn resolve(node: &GraphNode, config: &SceneConfig) -> NodeVisual {
	let color = node_color(&node.kind);
	let surface = config.params().surface;
	let radius = sphere_radius(node.val, config.node_rel_size);

	match node.kind {
		NodeKind::Thought => NodeVisual {
			shape: NodeShape::GlowSprite,
			color,
			material: Material {
				color,
				roughness: 1.0,
				metalness: 0.0,
				clearcoat: 0.0,
				transmission: 0.0,
				opacity: 1.0,
				blending: Blending::Additive,
				depth_write: false,
			},
			radius: radius * config.glow_scale,
			texture: None,
		},
		NodeKind::Experience => NodeVisual {
			shape: NodeShape::GlassSphere,
			color,
			material: Material {
				color,
				roughness: (surface.roughness * 0.5).min(0.1),
				metalness: 0.0,
				clearcoat: 1.0,
				transmission: 0.95,
				opacity: 1.0,
				blending: Blending::Normal,
				depth_write: true,
			},
			radius,
			texture: None,
		},
		_ => NodeVisual {
			shape: NodeShape::SolidSphere,
			color,
			material: Material {
				// image-mapped spheres show the picture untinted
				color: if node.img.is_some() { WHITE } else { color },
				roughness: surface.roughness,
				metalness: 0.1,
				clearcoat: surface.clearcoat,
				transmission: 0.0,
				opacity: 1.0,
				blending: Blending::Normal,
				depth_write: true,
			},
			radius,
			texture: node.img.as_deref().map(Texture::pending),
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(kind: &str, img: Option<&str>) -> GraphNode {
		GraphNode {
			id: format!("{kind}-x"),
			name: "X".into(),
			kind: kind.into(),
			val: 10.0,
			desc: None,
			img: img.map(Into::into),
			link: None,
		}
	}

	#[test]
	fn color_table_is_total() {
		for kind in NodeKind::KNOWN.iter() {
			assert_ne!(node_color(kind), DEFAULT_COLOR, "{kind} should have its own color");
		}
		assert_eq!(node_color(&NodeKind::from("quasar")), DEFAULT_COLOR);
		assert_eq!(node_color(&NodeKind::Me).css(), "#ff0055");
	}

	#[test]
	fn every_kind_resolves() {
		let config = SceneConfig::default();
		let known = NodeKind::KNOWN;
		let kinds = known
			.iter()
			.map(|k| k.as_str().to_string())
			.chain(["definitely-not-a-type".to_string()]);
		for kind in kinds {
			let visual = resolve(&node(&kind, None), &config);
			assert!(visual.radius > 0.0);
			assert_eq!(visual.color, node_color(&NodeKind::from(kind.as_str())));
		}
	}

	#[test]
	fn shapes_follow_kind() {
		let config = SceneConfig::default();
		let thought = resolve(&node("thought", Some("/t.png")), &config);
		assert_eq!(thought.shape, NodeShape::GlowSprite);
		assert_eq!(thought.material.blending, Blending::Additive);
		assert!(!thought.material.depth_write);
		assert!(thought.texture.is_none());

		let book = resolve(&node("book", None), &config);
		assert!(thought.radius > book.radius);

		let glass = resolve(&node("experience", None), &config);
		assert_eq!(glass.shape, NodeShape::GlassSphere);
		assert!(glass.material.transmission > 0.9);
		assert!(glass.material.roughness <= 0.1);
		assert!(glass.material.clearcoat > 0.0);

		let hub = resolve(&node("hub", None), &config);
		assert_eq!(hub.shape, NodeShape::SolidSphere);
		assert_eq!(hub.material.color, DEFAULT_COLOR);
	}

	#[test]
	fn image_nodes_start_flat_until_the_texture_arrives() {
		let visual = resolve(&node("book", Some("/migrated/books-dune.jpg")), &SceneConfig::default());
		assert!(visual.texture.is_some());
		assert!(!visual.is_textured());
		assert_eq!(visual.color, node_color(&NodeKind::Book));
	}

	#[test]
	fn radius_grows_with_value() {
		assert!(sphere_radius(30.0, 4.0) > sphere_radius(10.0, 4.0));
		assert_eq!(sphere_radius(0.0, 4.0), 1.0);
		assert!((sphere_radius(8.0, 4.0) - 8.0).abs() < 1e-4);
	}

	#[test]
	fn color_helpers_saturate() {
		assert_eq!(Rgb::hex(0x808080).scale(10.0), WHITE);
		assert_eq!(Rgb(0, 0, 0).mix(WHITE, 0.5), Rgb(128, 128, 128));
		assert_eq!(Rgb::hex(0x00ccff).css(), "#00ccff");
	}
}
