//! 3D force-directed layout.
//!
//! The scene only talks to the simulation through [`LayoutEngine`]. The
//! engine shipped here drives an `fdg-sim` Fruchterman-Reingold simulation
//! in three dimensions and keeps a centred copy of its positions, so reads
//! between steps are cheap and always finite.

use fdg_sim::force::fruchterman_reingold;
use fdg_sim::{Dimensions, ForceGraph, ForceGraphHelper, Simulation, SimulationParameters};
use glam::Vec3;
use log::warn;

pub trait LayoutEngine {
	/// Advances the simulation by one tick. A settled engine does nothing.
	fn step(&mut self);
	/// Current position of node `index`. Always finite.
	fn position(&self, index: usize) -> Vec3;
	fn is_settled(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutParameters {
	/// Ideal edge length of the Fruchterman-Reingold model.
	pub scale: f32,
	/// Velocity kept per tick.
	pub cooloff_factor: f32,
	/// Side of the cube the nodes are scattered in before the first tick.
	pub start_size: f32,
	/// Simulated seconds per tick.
	pub dt: f32,
	/// Largest per-tick movement that still counts as at rest.
	pub rest_distance: f32,
	pub max_ticks: u32,
}

impl Default for LayoutParameters {
	fn default() -> Self {
		Self {
			scale: 45.0,
			cooloff_factor: 0.975,
			start_size: 200.0,
			dt: 0.035,
			rest_distance: 0.01,
			max_ticks: 600,
		}
	}
}

pub struct ForceLayout {
	simulation: Simulation<(), ()>,
	positions: Vec<Vec3>,
	params: LayoutParameters,
	ticks: u32,
	settled: bool,
}

impl ForceLayout {
	/// `links` are `(source, target)` indices into `0..node_count`; anything
	/// out of range is ignored.
	pub fn new(node_count: usize, links: &[(usize, usize)], params: LayoutParameters) -> Self {
		let mut graph: ForceGraph<(), ()> = ForceGraph::default();
		let indices: Vec<_> = (0..node_count)
			.map(|i| graph.add_force_node(&i.to_string(), ()))
			.collect();
		for &(s, t) in links {
			if let (Some(&a), Some(&b)) = (indices.get(s), indices.get(t)) {
				graph.add_edge(a, b, ());
			}
		}

		let simulation = Simulation::from_graph(
			graph,
			SimulationParameters::new(
				params.start_size,
				Dimensions::Three,
				fruchterman_reingold(params.scale, params.cooloff_factor),
			),
		);
		let mut layout = Self {
			simulation,
			positions: vec![Vec3::ZERO; node_count],
			params,
			ticks: 0,
			settled: node_count == 0,
		};
		if layout.sync().is_none() {
			warn!("Initial layout was not finite; nodes start at the origin");
		}
		layout
	}

	/// Copies the simulation's positions, centred on the origin. Returns the
	/// largest movement since the last copy, or `None` (keeping the old
	/// positions) when the simulation produced a non-finite coordinate.
	fn sync(&mut self) -> Option<f32> {
		let raw: Vec<Vec3> = self
			.simulation
			.get_graph()
			.node_weights()
			.map(|node| Vec3::new(node.location.x, node.location.y, node.location.z))
			.collect();
		if raw.len() != self.positions.len() || !raw.iter().all(|p| p.is_finite()) {
			return None;
		}
		let center = raw.iter().copied().sum::<Vec3>() / raw.len().max(1) as f32;
		let mut moved = 0.0f32;
		for (slot, p) in self.positions.iter_mut().zip(raw) {
			let p = p - center;
			moved = moved.max(slot.distance(p));
			*slot = p;
		}
		Some(moved)
	}
}

impl LayoutEngine for ForceLayout {
	fn step(&mut self) {
		if self.settled {
			return;
		}
		self.simulation.update(self.params.dt);
		self.ticks += 1;
		match self.sync() {
			Some(moved) => {
				self.settled = moved < self.params.rest_distance || self.ticks >= self.params.max_ticks;
			}
			None => {
				warn!("Layout diverged after {} ticks; freezing positions", self.ticks);
				self.settled = true;
			}
		}
	}

	fn position(&self, index: usize) -> Vec3 {
		self.positions.get(index).copied().unwrap_or(Vec3::ZERO)
	}

	fn is_settled(&self) -> bool {
		self.settled
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(layout: &mut ForceLayout, ticks: usize) {
		for _ in 0..ticks {
			layout.step();
		}
	}

	fn centroid(layout: &ForceLayout, n: usize) -> Vec3 {
		(0..n).map(|i| layout.position(i)).sum::<Vec3>() / n as f32
	}

	#[test]
	fn initial_positions_are_distinct_finite_and_centred() {
		let layout = ForceLayout::new(50, &[], LayoutParameters::default());
		for i in 0..50 {
			assert!(layout.position(i).is_finite());
			for j in 0..i {
				assert!(layout.position(i).distance(layout.position(j)) > 1e-3);
			}
		}
		assert!(centroid(&layout, 50).length() < 1e-2);
		assert!(!layout.is_settled());
	}

	#[test]
	fn links_pull_their_endpoints_together() {
		let mut linked = ForceLayout::new(6, &[(0, 1)], LayoutParameters::default());
		let mut free = ForceLayout::new(6, &[], LayoutParameters::default());
		run(&mut linked, 300);
		run(&mut free, 300);
		let with_link = linked.position(0).distance(linked.position(1));
		let without = free.position(0).distance(free.position(1));
		assert!(with_link < without, "linked {with_link} vs free {without}");
		for i in 0..6 {
			assert!(linked.position(i).is_finite());
			assert!(free.position(i).is_finite());
		}
	}

	#[test]
	fn stops_moving_once_settled() {
		let params = LayoutParameters {
			max_ticks: 20,
			..LayoutParameters::default()
		};
		let mut layout = ForceLayout::new(4, &[(0, 1), (1, 2), (2, 3)], params);
		run(&mut layout, 20);
		assert!(layout.is_settled());
		let before = layout.position(2);
		layout.step();
		assert_eq!(layout.position(2), before);
		assert!(centroid(&layout, 4).length() < 1e-2);
	}

	#[test]
	fn out_of_range_links_and_queries_are_harmless() {
		let mut layout = ForceLayout::new(2, &[(0, 9), (0, 1)], LayoutParameters::default());
		run(&mut layout, 10);
		assert!(layout.position(0).is_finite());
		assert_eq!(layout.position(42), Vec3::ZERO);
	}

	#[test]
	fn empty_graph_is_settled_from_the_start() {
		let mut layout = ForceLayout::new(0, &[], LayoutParameters::default());
		assert!(layout.is_settled());
		run(&mut layout, 3);
		assert_eq!(layout.position(0), Vec3::ZERO);
	}
}
