//! Scene-wide rendering context: starfield, lights, environment reflections
//! and the bloom post-process. Built once per canvas, independent of nodes.

use glam::Vec3;
use rand::Rng;

use super::theme::{BloomParams, SceneConfig};
use super::visuals::{Material, Rgb, WHITE};

/// Decorative background points, generated once.
pub struct StarField {
	pub positions: Vec<Vec3>,
	pub size: f64,
	pub opacity: f64,
}

impl StarField {
	/// `count` points uniformly inside a cube of side `extent` around the origin.
	pub fn generate<R: Rng>(count: usize, extent: f32, size: f64, opacity: f64, rng: &mut R) -> Self {
		let half = extent * 0.5;
		let positions = (0..count)
			.map(|_| {
				Vec3::new(
					rng.gen_range(-half..=half),
					rng.gen_range(-half..=half),
					rng.gen_range(-half..=half),
				)
			})
			.collect();
		Self {
			positions,
			size,
			opacity,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AmbientLight {
	pub color: Rgb,
	pub intensity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
	pub color: Rgb,
	pub intensity: f32,
	/// Unit vector pointing from the scene towards the light.
	pub direction: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighting {
	pub ambient: AmbientLight,
	pub directional: DirectionalLight,
}

impl Default for Lighting {
	fn default() -> Self {
		Self {
			ambient: AmbientLight {
				color: WHITE,
				intensity: 0.35,
			},
			directional: DirectionalLight {
				color: WHITE,
				intensity: 0.8,
				direction: Vec3::new(0.35, 1.0, 0.6).normalize(),
			},
		}
	}
}

/// Procedural stand-in for an HDR capture of a neutral interior: bright
/// ceiling panels, grey walls and a darker floor.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RoomEnvironment;

impl RoomEnvironment {
	/// Radiance seen along `dir` (world space), in `0..=1`.
	pub fn sample(&self, dir: Vec3) -> f32 {
		let dir = dir.normalize_or_zero();
		let wall = 0.35;
		if dir.y > 0.6 {
			// ceiling with light panels towards the zenith
			wall + (dir.y - 0.6) / 0.4 * 0.65
		} else if dir.y < -0.3 {
			wall * (1.0 + dir.y) / 0.7
		} else {
			wall
		}
	}
}

/// How a sphere should be painted for the current light and view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphereShading {
	pub lit: Rgb,
	pub shadow: Rgb,
	/// Highlight offset from the center as a fraction of the radius, screen
	/// space (y down).
	pub highlight_offset: (f64, f64),
	pub highlight_size: f64,
	pub highlight_alpha: f64,
	/// Environment reflection strength at the rim.
	pub rim_alpha: f64,
}

impl Lighting {
	/// `light_view` is the directional light expressed in camera space.
	pub fn shade_sphere(&self, material: &Material, env: &RoomEnvironment, light_view: Vec3) -> SphereShading {
		let ambient = self.ambient.intensity;
		let direct = self.directional.intensity * light_view.z.max(0.0).mul_add(0.5, 0.5);
		// energy is capped so glossy materials never blow out
		let lit = material.color.scale((ambient + direct).min(1.0));
		let shadow = material.color.scale(ambient);

		let gloss = (1.0 - material.roughness).clamp(0.0, 1.0);
		let highlight_alpha = (material.clearcoat.max(material.metalness) * gloss * 0.9).min(0.9);
		let reflected = env.sample(Vec3::Y);
		SphereShading {
			lit,
			shadow,
			highlight_offset: (light_view.x as f64 * 0.45, -light_view.y as f64 * 0.45),
			highlight_size: 0.12 + material.roughness as f64 * 0.5,
			highlight_alpha: highlight_alpha as f64,
			rim_alpha: (reflected * gloss * 0.35) as f64,
		}
	}
}

/// Threshold-blur-add glow over the finished frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomPass {
	pub params: BloomParams,
}

impl BloomPass {
	/// Canvas filter that keeps only pixels brighter than the threshold
	/// (remapped to `0..1`) and blurs them. `brightness(b) contrast(c)` is the
	/// linear map `(b * x - 0.5) * c + 0.5`; solving for zero at the threshold
	/// and one at full white gives the two factors below.
	pub fn filter(&self, blur_scale: f64) -> String {
		let t = self.params.threshold.clamp(0.0, 0.99);
		let slope = 1.0 / (1.0 - t);
		let contrast = 1.0 + 2.0 * t * slope;
		let brightness = slope / contrast;
		format!(
			"brightness({brightness:.4}) contrast({contrast:.4}) blur({:.1}px)",
			(self.params.radius * blur_scale).max(0.0)
		)
	}

	/// Alpha values for successive additive draws of the blurred layer.
	pub fn passes(&self) -> Vec<f64> {
		let mut remaining = self.params.strength.max(0.0);
		let mut alphas = Vec::new();
		while remaining > 1e-3 {
			alphas.push(remaining.min(1.0));
			remaining -= 1.0;
		}
		alphas
	}
}

pub struct SceneCompositor {
	pub stars: StarField,
	pub lighting: Lighting,
	pub environment: RoomEnvironment,
	pub bloom: BloomPass,
}

impl SceneCompositor {
	pub fn new<R: Rng>(config: &SceneConfig, rng: &mut R) -> Self {
		let params = config.params();
		Self {
			stars: StarField::generate(
				params.stars.count,
				config.star_extent,
				params.stars.size,
				params.stars.opacity,
				rng,
			),
			lighting: Lighting::default(),
			environment: RoomEnvironment,
			bloom: BloomPass {
				params: params.bloom,
			},
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::components::knowledge_graph::visuals::Blending;

	fn material(color: Rgb, roughness: f32, clearcoat: f32) -> Material {
		Material {
			color,
			roughness,
			metalness: 0.0,
			clearcoat,
			transmission: 0.0,
			opacity: 1.0,
			blending: Blending::Normal,
			depth_write: true,
		}
	}

	#[test]
	fn starfield_fills_the_cube() {
		let mut rng = StdRng::seed_from_u64(7);
		let stars = StarField::generate(1500, 2000.0, 2.0, 0.8, &mut rng);
		assert_eq!(stars.positions.len(), 1500);
		assert!(stars.positions.iter().all(|p| p.abs().max_element() <= 1000.0));
	}

	#[test]
	fn compositor_follows_theme() {
		let mut rng = StdRng::seed_from_u64(1);
		let config = SceneConfig::default();
		let compositor = SceneCompositor::new(&config, &mut rng);
		assert_eq!(compositor.stars.positions.len(), config.params().stars.count);
		assert_eq!(compositor.bloom.params, config.params().bloom);
	}

	#[test]
	fn bloom_filter_maps_threshold_to_black_and_white_to_white() {
		let bloom = BloomPass {
			params: BloomParams {
				strength: 1.5,
				radius: 0.4,
				threshold: 0.85,
			},
		};
		let t = 0.85f64;
		let slope = 1.0 / (1.0 - t);
		let c = 1.0 + 2.0 * t * slope;
		let b = slope / c;
		let map = |x: f64| (b * x - 0.5) * c + 0.5;
		assert!(map(t).abs() < 1e-9);
		assert!((map(1.0) - 1.0).abs() < 1e-9);
		assert!(bloom.filter(40.0).ends_with("blur(16.0px)"));
		assert_eq!(bloom.passes(), vec![1.0, 0.5]);
	}

	#[test]
	fn shading_never_overexposes() {
		let lighting = Lighting::default();
		let env = RoomEnvironment;
		let s = lighting.shade_sphere(&material(WHITE, 0.2, 1.0), &env, Vec3::Z);
		assert!(s.lit.luminance() <= 1.0 + 1e-4);
		assert!(s.shadow.luminance() < s.lit.luminance());
		assert!(s.highlight_alpha > 0.5);

		let matte = lighting.shade_sphere(&material(WHITE, 1.0, 0.0), &env, Vec3::Z);
		assert_eq!(matte.highlight_alpha, 0.0);
		assert_eq!(matte.rim_alpha, 0.0);
	}

	#[test]
	fn environment_is_brightest_overhead() {
		let env = RoomEnvironment;
		assert!(env.sample(Vec3::Y) > env.sample(Vec3::X));
		assert!(env.sample(Vec3::X) > env.sample(Vec3::NEG_Y));
		assert!(env.sample(Vec3::Y) <= 1.0);
	}
}
