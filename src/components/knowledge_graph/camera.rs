use std::f32::consts::PI;

use glam::Vec3;

const ROTATE_SPEED: f32 = 0.005;
const MIN_DISTANCE: f32 = 5.0;
const MAX_DISTANCE: f32 = 4000.0;
const POLAR_EPS: f32 = 0.01;

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// A point projected onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
	pub x: f64,
	pub y: f64,
	/// Distance in front of the camera along its view axis.
	pub depth: f32,
	/// Pixels per world unit at this depth.
	pub scale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
	pub position: Vec3,
	pub target: Vec3,
	pub fov_y: f32,
	pub near: f32,
	pub far: f32,
}

impl Camera {
	pub fn new(position: Vec3, target: Vec3, fov_degrees: f32) -> Self {
		Self {
			position,
			target,
			fov_y: fov_degrees.to_radians(),
			near: 0.1,
			far: 10_000.0,
		}
	}

	fn up(&self) -> Vec3 {
		let forward = (self.target - self.position).normalize_or_zero();
		if forward.cross(Vec3::Y).length_squared() < 1e-6 {
			Vec3::Z
		} else {
			Vec3::Y
		}
	}

	pub fn view(&self) -> glam::Mat4 {
		glam::Mat4::look_at_rh(self.position, self.target, self.up())
	}

	/// Direction expressed in camera space (x right, y up, -z forward).
	pub fn to_view_dir(&self, dir: Vec3) -> Vec3 {
		self.view().transform_vector3(dir)
	}

	#[cfg(test)]
	pub fn project(&self, point: Vec3, width: f64, height: f64) -> Option<Projection> {
		self.project_with(&self.view(), point, width, height)
	}

	/// Projects `point` to canvas pixels with a precomputed view matrix, so
	/// a frame builds the view once for every node.
	pub fn project_with(
		&self,
		view: &glam::Mat4,
		point: Vec3,
		width: f64,
		height: f64,
	) -> Option<Projection> {
		let v = view.transform_point3(point);
		let depth = -v.z;
		if depth <= self.near || depth > self.far || height <= 0.0 {
			return None;
		}
		let focal = 1.0 / (self.fov_y as f64 * 0.5).tan();
		let aspect = width / height;
		let (ndc_x, ndc_y) = (
			v.x as f64 * focal / aspect / depth as f64,
			v.y as f64 * focal / depth as f64,
		);
		Some(Projection {
			x: (ndc_x + 1.0) * 0.5 * width,
			y: (1.0 - ndc_y) * 0.5 * height,
			depth,
			scale: focal * height * 0.5 / depth as f64,
		})
	}
}

/// A requested camera flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraMove {
	pub position: Vec3,
	pub look_at: Vec3,
	pub duration_ms: f64,
}

/// Anything that can fly a camera somewhere.
pub trait CameraRig {
	fn fly_to(&mut self, to: CameraMove);
}

#[derive(Clone, Debug)]
struct Transition {
	from_position: Vec3,
	from_target: Vec3,
	to: CameraMove,
	started_ms: f64,
}

/// Owns the camera, animates fly-to transitions and applies orbit/zoom input.
pub struct CameraController {
	pub camera: Camera,
	transition: Option<Transition>,
	now_ms: f64,
}

impl CameraController {
	pub fn new(camera: Camera) -> Self {
		Self {
			camera,
			transition: None,
			now_ms: 0.0,
		}
	}

	/// Starting distance that keeps a freshly laid out graph in view.
	pub fn initial_distance(node_count: usize) -> f32 {
		((node_count.max(1) as f32).cbrt() * 170.0).max(200.0)
	}

	#[cfg(test)]
	pub fn is_animating(&self) -> bool {
		self.transition.is_some()
	}

	/// Advances any running transition to `now_ms`.
	pub fn update(&mut self, now_ms: f64) {
		self.now_ms = now_ms;
		let Some(t) = &self.transition else {
			return;
		};
		let progress = if t.to.duration_ms <= 0.0 {
			1.0
		} else {
			((now_ms - t.started_ms) / t.to.duration_ms).clamp(0.0, 1.0)
		};
		let eased = ease_out_cubic(progress) as f32;
		self.camera.position = t.from_position.lerp(t.to.position, eased);
		self.camera.target = t.from_target.lerp(t.to.look_at, eased);
		if progress >= 1.0 {
			self.transition = None;
		}
	}

	/// Rotates around the current look-at point by a pointer delta in pixels.
	pub fn orbit(&mut self, dx: f64, dy: f64) {
		self.transition = None;
		let offset = self.camera.position - self.camera.target;
		let radius = offset.length().max(MIN_DISTANCE);
		let theta = offset.x.atan2(offset.z) - dx as f32 * ROTATE_SPEED;
		let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() - dy as f32 * ROTATE_SPEED)
			.clamp(POLAR_EPS, PI - POLAR_EPS);
		self.camera.position = self.camera.target
			+ radius * Vec3::new(phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos());
	}

	/// Moves towards (`factor < 1`) or away from the look-at point.
	pub fn dolly(&mut self, factor: f32) {
		self.transition = None;
		let offset = self.camera.position - self.camera.target;
		let distance = (offset.length() * factor).clamp(MIN_DISTANCE, MAX_DISTANCE);
		let dir = offset.try_normalize().unwrap_or(Vec3::Z);
		self.camera.position = self.camera.target + dir * distance;
	}
}

impl CameraRig for CameraController {
	fn fly_to(&mut self, to: CameraMove) {
		self.transition = Some(Transition {
			from_position: self.camera.position,
			from_target: self.camera.target,
			to,
			started_ms: self.now_ms,
		});
	}
}
