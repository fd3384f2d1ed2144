use std::collections::HashMap;
use std::f64::consts::PI;

use glam::Mat4;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::camera::Projection;
use super::compositor::SphereShading;
use super::state::GraphScene;
use super::visuals::{NodeShape, NodeVisual, Rgb};
use crate::error::{Error, Result};

const GLOW_TEXTURE_PX: u32 = 64;
/// Blur radius in pixels per unit of bloom radius, at full resolution.
const BLOOM_BLUR_PX: f64 = 40.0;

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
	canvas
		.get_context("2d")?
		.ok_or_else(|| Error::Browser("2d context unavailable".into()))?
		.dyn_into::<CanvasRenderingContext2d>()
		.map_err(|_| Error::Browser("unexpected context type".into()))
}

fn offscreen_canvas(width: u32, height: u32) -> Result<HtmlCanvasElement> {
	let document = web_sys::window()
		.and_then(|w| w.document())
		.ok_or_else(|| Error::Browser("no document".into()))?;
	let canvas: HtmlCanvasElement = document
		.create_element("canvas")?
		.dyn_into()
		.map_err(|_| Error::Browser("not a canvas".into()))?;
	canvas.set_width(width);
	canvas.set_height(height);
	Ok(canvas)
}

/// Gradient stops of the procedural glow texture: a white-hot core fading
/// through the node color to nothing.
pub fn glow_stops(color: Rgb) -> [(f64, String); 4] {
	[
		(0.0, "rgba(255, 255, 255, 1)".to_string()),
		(0.2, color.rgba(0.9)),
		(0.5, color.rgba(0.35)),
		(1.0, color.rgba(0.0)),
	]
}

/// Position of particle `i` of `count` along a link at time `flow_time`,
/// as a fraction from source to target.
pub fn particle_phase(flow_time: f64, speed_per_frame: f64, i: usize, count: usize) -> f64 {
	(flow_time * 60.0 * speed_per_frame + i as f64 / count.max(1) as f64).fract()
}

/// Draws a [`GraphScene`] onto its canvas and runs post-processing.
pub struct Renderer {
	canvas: HtmlCanvasElement,
	ctx: CanvasRenderingContext2d,
	bloom_canvas: HtmlCanvasElement,
	bloom_ctx: CanvasRenderingContext2d,
	glow_textures: HashMap<Rgb, HtmlCanvasElement>,
}

impl Renderer {
	pub fn new(canvas: &HtmlCanvasElement) -> Result<Self> {
		let ctx = context_2d(canvas)?;
		let bloom_canvas = offscreen_canvas((canvas.width() / 2).max(1), (canvas.height() / 2).max(1))?;
		let bloom_ctx = context_2d(&bloom_canvas)?;
		Ok(Self {
			canvas: canvas.clone(),
			ctx,
			bloom_canvas,
			bloom_ctx,
			glow_textures: HashMap::new(),
		})
	}

	pub fn render(&mut self, scene: &GraphScene) -> Result<()> {
		let ctx = &self.ctx;
		ctx.set_global_composite_operation("source-over")?;
		ctx.set_global_alpha(1.0);
		ctx.set_fill_style_str(scene.config.background);
		ctx.fill_rect(0.0, 0.0, scene.width, scene.height);

		let camera = &scene.camera.camera;
		let view = camera.view();
		let projected: Vec<Option<Projection>> = (0..scene.nodes.len())
			.map(|i| camera.project_with(&view, scene.position(i), scene.width, scene.height))
			.collect();

		self.draw_stars(scene, &view);
		self.draw_links(scene, &projected);
		self.draw_particles(scene, &view);
		self.draw_nodes(scene, &projected)?;
		self.draw_hover_label(scene, &projected);
		self.bloom(scene)
	}

	fn draw_stars(&self, scene: &GraphScene, view: &Mat4) {
		let (ctx, camera, stars) = (&self.ctx, &scene.camera.camera, &scene.compositor.stars);
		ctx.begin_path();
		for &star in &stars.positions {
			if let Some(p) = camera.project_with(view, star, scene.width, scene.height) {
				let size = (stars.size * p.scale).clamp(0.5, 2.5);
				ctx.rect(p.x - size * 0.5, p.y - size * 0.5, size, size);
			}
		}
		ctx.set_global_alpha(stars.opacity);
		ctx.set_fill_style_str("#ffffff");
		ctx.fill();
		ctx.set_global_alpha(1.0);
	}

	fn draw_links(&self, scene: &GraphScene, projected: &[Option<Projection>]) {
		let ctx = &self.ctx;
		let (r, g, b) = scene.config.link_color;
		ctx.set_stroke_style_str(&Rgb(r, g, b).rgba(scene.config.link_opacity));
		for &(src, tgt) in &scene.links {
			let (Some(a), Some(b)) = (projected[src], projected[tgt]) else {
				continue;
			};
			let scale = (a.scale + b.scale) * 0.5;
			ctx.set_line_width((scene.config.link_width * scale).max(0.5));
			ctx.begin_path();
			ctx.move_to(a.x, a.y);
			ctx.line_to(b.x, b.y);
			ctx.stroke();
		}
	}

	fn draw_particles(&self, scene: &GraphScene, view: &Mat4) {
		let (ctx, camera, config) = (&self.ctx, &scene.camera.camera, &scene.config);
		ctx.set_fill_style_str("rgba(255, 255, 255, 0.9)");
		for &(src, tgt) in &scene.links {
			let (from, to) = (scene.position(src), scene.position(tgt));
			for i in 0..config.particles_per_link {
				let t = particle_phase(scene.flow_time, config.particle_speed, i, config.particles_per_link);
				let point = from.lerp(to, t as f32);
				let Some(p) = camera.project_with(view, point, scene.width, scene.height) else {
					continue;
				};
				ctx.begin_path();
				let _ = ctx.arc(p.x, p.y, (config.particle_width * 0.5 * p.scale).max(0.75), 0.0, 2.0 * PI);
				ctx.fill();
			}
		}
	}

	fn draw_nodes(&mut self, scene: &GraphScene, projected: &[Option<Projection>]) -> Result<()> {
		// painter's order: far to near
		let mut order: Vec<(usize, Projection)> = projected
			.iter()
			.enumerate()
			.filter_map(|(i, p)| p.map(|p| (i, p)))
			.collect();
		order.sort_by(|a, b| b.1.depth.total_cmp(&a.1.depth));

		let compositor = &scene.compositor;
		let light_view = scene
			.camera
			.camera
			.to_view_dir(compositor.lighting.directional.direction);

		for (idx, p) in order {
			let visual = &scene.nodes[idx].visual;
			let radius = visual.radius as f64 * p.scale;
			if radius < 0.3 {
				continue;
			}
			let mut material = visual.material;
			if visual.texture.is_some() && !visual.is_textured() {
				// until (or unless) the image arrives, show the type color
				material.color = visual.color;
			}
			let shading = compositor
				.lighting
				.shade_sphere(&material, &compositor.environment, light_view);
			match visual.shape {
				NodeShape::GlowSprite => self.draw_glow(visual, p.x, p.y, radius)?,
				NodeShape::GlassSphere => self.draw_glass_sphere(visual, &shading, p.x, p.y, radius)?,
				NodeShape::SolidSphere => {
					let textured = visual
						.texture
						.as_ref()
						.and_then(|t| t.with_image(|img| self.draw_textured_sphere(img, &shading, p.x, p.y, radius)));
					match textured {
						Some(result) => result?,
						None => self.draw_shaded_sphere(&shading, p.x, p.y, radius)?,
					}
				}
			}
		}
		Ok(())
	}

	fn draw_specular(&self, shading: &SphereShading, x: f64, y: f64, radius: f64) -> Result<()> {
		if shading.highlight_alpha < 0.01 {
			return Ok(());
		}
		let ctx = &self.ctx;
		let (hx, hy) = (
			x + shading.highlight_offset.0 * radius,
			y + shading.highlight_offset.1 * radius,
		);
		let size = (radius * shading.highlight_size).max(0.5);
		let gradient = ctx.create_radial_gradient(hx, hy, 0.0, hx, hy, size)?;
		gradient.add_color_stop(0.0, &format!("rgba(255, 255, 255, {})", shading.highlight_alpha))?;
		gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)")?;
		ctx.begin_path();
		ctx.arc(hx, hy, size, 0.0, 2.0 * PI)?;
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
		Ok(())
	}

	fn draw_rim(&self, shading: &SphereShading, x: f64, y: f64, radius: f64) -> Result<()> {
		if shading.rim_alpha < 0.01 {
			return Ok(());
		}
		let ctx = &self.ctx;
		ctx.begin_path();
		ctx.arc(x, y, radius * 0.97, 0.0, 2.0 * PI)?;
		ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", shading.rim_alpha));
		ctx.set_line_width((radius * 0.06).max(0.5));
		ctx.stroke();
		Ok(())
	}

	fn draw_shaded_sphere(&self, shading: &SphereShading, x: f64, y: f64, radius: f64) -> Result<()> {
		let ctx = &self.ctx;
		let (hx, hy) = (
			x + shading.highlight_offset.0 * radius,
			y + shading.highlight_offset.1 * radius,
		);
		let gradient = ctx.create_radial_gradient(hx, hy, radius * 0.05, x, y, radius)?;
		gradient.add_color_stop(0.0, &shading.lit.css())?;
		gradient.add_color_stop(0.7, &shading.lit.mix(shading.shadow, 0.5).css())?;
		gradient.add_color_stop(1.0, &shading.shadow.css())?;
		ctx.begin_path();
		ctx.arc(x, y, radius, 0.0, 2.0 * PI)?;
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();
		self.draw_specular(shading, x, y, radius)?;
		self.draw_rim(shading, x, y, radius)
	}

	fn draw_textured_sphere(
		&self,
		img: &web_sys::HtmlImageElement,
		shading: &SphereShading,
		x: f64,
		y: f64,
		radius: f64,
	) -> Result<()> {
		let ctx = &self.ctx;
		ctx.save();
		ctx.begin_path();
		ctx.arc(x, y, radius, 0.0, 2.0 * PI)?;
		ctx.clip();
		ctx.draw_image_with_html_image_element_and_dw_and_dh(img, x - radius, y - radius, radius * 2.0, radius * 2.0)?;

		// darken towards the terminator so the picture reads as a ball
		let (hx, hy) = (
			x + shading.highlight_offset.0 * radius,
			y + shading.highlight_offset.1 * radius,
		);
		let shade = ctx.create_radial_gradient(hx, hy, radius * 0.1, x, y, radius)?;
		shade.add_color_stop(0.0, "rgba(0, 0, 0, 0)")?;
		shade.add_color_stop(1.0, "rgba(0, 0, 0, 0.55)")?;
		#[allow(deprecated)]
		ctx.set_fill_style(&shade);
		ctx.fill_rect(x - radius, y - radius, radius * 2.0, radius * 2.0);
		ctx.restore();

		self.draw_specular(shading, x, y, radius)
	}

	fn draw_glass_sphere(&self, visual: &NodeVisual, shading: &SphereShading, x: f64, y: f64, radius: f64) -> Result<()> {
		let ctx = &self.ctx;
		let material = &visual.material;
		// what little is not transmitted shows as tint, strongest at grazing angles
		let body = ((1.0 - material.transmission) as f64 + 0.1) * material.opacity as f64;
		let gradient = ctx.create_radial_gradient(x, y, 0.0, x, y, radius)?;
		gradient.add_color_stop(0.0, &material.color.rgba(body * 0.5))?;
		gradient.add_color_stop(0.8, &material.color.rgba(body))?;
		gradient.add_color_stop(1.0, &material.color.rgba((body + 0.35).min(1.0)))?;
		ctx.begin_path();
		ctx.arc(x, y, radius, 0.0, 2.0 * PI)?;
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill();

		ctx.set_stroke_style_str(&material.color.mix(Rgb(255, 255, 255), 0.5).rgba(0.6));
		ctx.set_line_width((radius * 0.04).max(0.5));
		ctx.stroke();

		self.draw_rim(shading, x, y, radius)?;
		self.draw_specular(shading, x, y, radius)
	}

	fn glow_texture(&mut self, color: Rgb) -> Result<HtmlCanvasElement> {
		if let Some(texture) = self.glow_textures.get(&color) {
			return Ok(texture.clone());
		}
		let size = GLOW_TEXTURE_PX as f64;
		let canvas = offscreen_canvas(GLOW_TEXTURE_PX, GLOW_TEXTURE_PX)?;
		let ctx = context_2d(&canvas)?;
		let gradient = ctx.create_radial_gradient(size / 2.0, size / 2.0, 0.0, size / 2.0, size / 2.0, size / 2.0)?;
		for (offset, stop) in glow_stops(color) {
			gradient.add_color_stop(offset as f32, &stop)?;
		}
		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
		ctx.fill_rect(0.0, 0.0, size, size);
		self.glow_textures.insert(color, canvas.clone());
		Ok(canvas)
	}

	fn draw_glow(&mut self, visual: &NodeVisual, x: f64, y: f64, radius: f64) -> Result<()> {
		let texture = self.glow_texture(visual.color)?;
		let ctx = &self.ctx;
		ctx.set_global_composite_operation("lighter")?;
		ctx.set_global_alpha(visual.material.opacity as f64);
		ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&texture, x - radius, y - radius, radius * 2.0, radius * 2.0)?;
		ctx.set_global_alpha(1.0);
		ctx.set_global_composite_operation("source-over")?;
		Ok(())
	}

	fn draw_hover_label(&self, scene: &GraphScene, projected: &[Option<Projection>]) {
		let Some((idx, Some(p))) = scene.hover.map(|i| (i, projected.get(i).copied().flatten())) else {
			return;
		};
		let node = &scene.nodes[idx];
		let radius = scene.hit_radius(&node.visual) as f64 * p.scale;
		let ctx = &self.ctx;

		// marching dashed ring around the hovered node
		ctx.set_stroke_style_str(&node.visual.color.rgba(0.8));
		ctx.set_line_width(1.5);
		let _ = ctx.set_line_dash(&js_sys::Array::of2(&JsValue::from_f64(4.0), &JsValue::from_f64(4.0)));
		ctx.set_line_dash_offset(-scene.flow_time * 20.0);
		ctx.begin_path();
		let _ = ctx.arc(p.x, p.y, radius + 4.0, 0.0, 2.0 * PI);
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		ctx.set_font("13px sans-serif");
		ctx.set_shadow_color("rgba(0, 0, 0, 0.9)");
		ctx.set_shadow_blur(4.0);
		ctx.set_fill_style_str("white");
		let _ = ctx.fill_text(&node.name, p.x + radius.min(40.0) + 10.0, p.y + 4.0);
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_color("rgba(0, 0, 0, 0)");
	}

	/// Runs after the color pass: threshold and blur a half-size copy of the
	/// frame, then add it back on top.
	fn bloom(&self, scene: &GraphScene) -> Result<()> {
		let bloom = &scene.compositor.bloom;
		let passes = bloom.passes();
		if passes.is_empty() {
			return Ok(());
		}
		let (w, h) = ((self.canvas.width() / 2).max(1), (self.canvas.height() / 2).max(1));
		if self.bloom_canvas.width() != w || self.bloom_canvas.height() != h {
			self.bloom_canvas.set_width(w);
			self.bloom_canvas.set_height(h);
		}
		let (bw, bh) = (w as f64, h as f64);

		let bctx = &self.bloom_ctx;
		bctx.clear_rect(0.0, 0.0, bw, bh);
		bctx.set_filter(&bloom.filter(BLOOM_BLUR_PX * 0.5));
		bctx.draw_image_with_html_canvas_element_and_dw_and_dh(&self.canvas, 0.0, 0.0, bw, bh)?;
		bctx.set_filter("none");

		let ctx = &self.ctx;
		ctx.set_global_composite_operation("lighter")?;
		for alpha in passes {
			ctx.set_global_alpha(alpha);
			ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&self.bloom_canvas, 0.0, 0.0, scene.width, scene.height)?;
		}
		ctx.set_global_alpha(1.0);
		ctx.set_global_composite_operation("source-over")?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn glow_fades_to_transparent() {
		let stops = glow_stops(Rgb::hex(0xffff00));
		assert_eq!(stops[0].0, 0.0);
		assert_eq!(stops[3], (1.0, "rgba(255, 255, 0, 0)".to_string()));
		assert!(stops.windows(2).all(|w| w[0].0 < w[1].0));
	}

	#[test]
	fn particles_are_evenly_spaced_and_wrap() {
		let a = particle_phase(0.0, 0.005, 0, 2);
		let b = particle_phase(0.0, 0.005, 1, 2);
		assert_eq!((a, b), (0.0, 0.5));
		// 0.005 per frame at 60 fps crosses a link in 200 frames
		let wrapped = particle_phase(200.0 / 60.0, 0.005, 0, 2);
		assert!(wrapped < 1e-9 || wrapped > 1.0 - 1e-9);
	}
}
