use std::str::FromStr;

/// Aesthetic presets. Each one is a set of tuning values, not a separate
/// render path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ThemePreset {
	#[default]
	Nebula,
	Aurora,
	Minimal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BloomParams {
	pub strength: f64,
	pub radius: f64,
	/// Luminance in `0..1` below which pixels do not bloom.
	pub threshold: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarParams {
	pub count: usize,
	pub opacity: f64,
	pub size: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceParams {
	pub roughness: f32,
	pub clearcoat: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemeParams {
	pub bloom: BloomParams,
	pub stars: StarParams,
	pub surface: SurfaceParams,
}

impl ThemePreset {
	pub fn params(self) -> ThemeParams {
		match self {
			ThemePreset::Nebula => ThemeParams {
				bloom: BloomParams {
					strength: 1.5,
					radius: 0.4,
					threshold: 0.85,
				},
				stars: StarParams {
					count: 1500,
					opacity: 0.8,
					size: 2.0,
				},
				surface: SurfaceParams {
					roughness: 0.2,
					clearcoat: 1.0,
				},
			},
			ThemePreset::Aurora => ThemeParams {
				bloom: BloomParams {
					strength: 1.0,
					radius: 0.6,
					threshold: 0.7,
				},
				stars: StarParams {
					count: 2000,
					opacity: 0.5,
					size: 1.5,
				},
				surface: SurfaceParams {
					roughness: 0.1,
					clearcoat: 0.8,
				},
			},
			ThemePreset::Minimal => ThemeParams {
				bloom: BloomParams {
					strength: 0.6,
					radius: 0.3,
					threshold: 0.9,
				},
				stars: StarParams {
					count: 1800,
					opacity: 0.4,
					size: 1.5,
				},
				surface: SurfaceParams {
					roughness: 0.35,
					clearcoat: 0.5,
				},
			},
		}
	}

	/// Parses a preset name, falling back to the default for anything unknown.
	pub fn from_name(name: &str) -> Self {
		name.parse().unwrap_or_default()
	}
}

impl FromStr for ThemePreset {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"nebula" => Ok(ThemePreset::Nebula),
			"aurora" => Ok(ThemePreset::Aurora),
			"minimal" => Ok(ThemePreset::Minimal),
			other => Err(format!("unknown theme preset `{other}`")),
		}
	}
}

/// Fixed scene settings. Everything aesthetic that varies between presets
/// lives in [`ThemeParams`].
#[derive(Clone, Debug, PartialEq)]
pub struct SceneConfig {
	pub background: &'static str,
	pub link_color: (u8, u8, u8),
	pub link_opacity: f64,
	pub link_width: f64,
	pub particles_per_link: usize,
	pub particle_width: f64,
	/// Fraction of a link travelled per frame at 60 fps.
	pub particle_speed: f64,
	/// World units per `cbrt(val)`.
	pub node_rel_size: f32,
	/// Glow sprites are this many times wider than a sphere of the same value.
	pub glow_scale: f32,
	pub standoff_distance: f32,
	pub transition_ms: f64,
	pub fov_degrees: f32,
	pub star_extent: f32,
	pub theme: ThemePreset,
}

impl Default for SceneConfig {
	fn default() -> Self {
		Self {
			background: "#000005",
			link_color: (255, 255, 255),
			link_opacity: 0.2,
			link_width: 0.5,
			particles_per_link: 2,
			particle_width: 2.0,
			particle_speed: 0.005,
			node_rel_size: 4.0,
			glow_scale: 3.0,
			standoff_distance: 40.0,
			transition_ms: 3000.0,
			fov_degrees: 70.0,
			star_extent: 2000.0,
			theme: ThemePreset::default(),
		}
	}
}

impl SceneConfig {
	pub fn with_theme(theme: ThemePreset) -> Self {
		Self {
			theme,
			..Self::default()
		}
	}

	pub fn params(&self) -> ThemeParams {
		self.theme.params()
	}
}
