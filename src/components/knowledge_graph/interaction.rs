//! Turns pointer input into selection state and camera commands.

use glam::Vec3;
use leptos::prelude::*;
use log::debug;

use super::camera::{CameraMove, CameraRig};

/// Result of feeding an event to the controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionChange {
	Unchanged,
	Changed(Option<String>),
}

/// Camera position for inspecting a node at `node`: on the ray from the
/// origin through the node, `standoff` units beyond it.
pub fn fly_to_position(node: Vec3, standoff: f32) -> Vec3 {
	let len = node.length();
	if len < 1e-3 {
		return node + Vec3::Z * standoff;
	}
	node * (1.0 + standoff / len)
}

/// The only writer of the selected node.
#[derive(Clone, Debug)]
pub struct InteractionController {
	selected: Option<String>,
	standoff: f32,
	transition_ms: f64,
}

impl InteractionController {
	pub fn new(standoff: f32, transition_ms: f64) -> Self {
		Self {
			selected: None,
			standoff,
			transition_ms,
		}
	}

	#[cfg(test)]
	pub fn selected(&self) -> Option<&str> {
		self.selected.as_deref()
	}

	/// `position` must be the node's latest layout position.
	pub fn on_node_click<R: CameraRig>(&mut self, id: &str, position: Vec3, rig: &mut R) -> SelectionChange {
		rig.fly_to(CameraMove {
			position: fly_to_position(position, self.standoff),
			look_at: position,
			duration_ms: self.transition_ms,
		});
		debug!("Focus {id} at {position}");
		self.set(Some(id.to_string()))
	}

	pub fn on_background_click(&mut self) -> SelectionChange {
		self.set(None)
	}

	/// Close affordance on the overlay; same effect as a background click.
	pub fn close(&mut self) -> SelectionChange {
		self.on_background_click()
	}

	fn set(&mut self, next: Option<String>) -> SelectionChange {
		if self.selected == next {
			return SelectionChange::Unchanged;
		}
		self.selected = next.clone();
		SelectionChange::Changed(next)
	}
}

/// Shares one controller between the graph canvas and the overlay, and
/// publishes its selection as a read-only signal.
#[derive(Clone, Copy)]
pub struct SelectionBridge {
	controller: StoredValue<InteractionController, LocalStorage>,
	published: RwSignal<Option<String>>,
}

impl SelectionBridge {
	pub fn new(controller: InteractionController) -> Self {
		Self {
			controller: StoredValue::new_local(controller),
			published: RwSignal::new(None),
		}
	}

	pub fn selected(&self) -> Signal<Option<String>> {
		self.published.into()
	}

	pub fn node_click<R: CameraRig>(&self, id: &str, position: Vec3, rig: &mut R) {
		let change = self
			.controller
			.try_update_value(|c| c.on_node_click(id, position, rig));
		self.publish(change);
	}

	pub fn background_click(&self) {
		let change = self.controller.try_update_value(|c| c.on_background_click());
		self.publish(change);
	}

	pub fn close(&self) {
		let change = self.controller.try_update_value(|c| c.close());
		self.publish(change);
	}

	fn publish(&self, change: Option<SelectionChange>) {
		if let Some(SelectionChange::Changed(selected)) = change {
			debug!("Selection -> {selected:?}");
			self.published.set(selected);
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[derive(Default)]
	struct RecordingRig(Vec<CameraMove>);

	impl CameraRig for RecordingRig {
		fn fly_to(&mut self, to: CameraMove) {
			self.0.push(to);
		}
	}

	fn controller() -> InteractionController {
		InteractionController::new(40.0, 3000.0)
	}

	#[test]
	fn select_a_then_b_then_background() {
		let mut rig = RecordingRig::default();
		let mut c = controller();
		let (a, b) = (Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -20.0));

		assert_eq!(c.on_node_click("a", a, &mut rig), SelectionChange::Changed(Some("a".into())));
		assert_eq!(c.on_node_click("b", b, &mut rig), SelectionChange::Changed(Some("b".into())));
		assert_eq!(c.on_background_click(), SelectionChange::Changed(None));

		assert_eq!(c.selected(), None);
		assert_eq!(rig.0.len(), 2);
		assert_eq!(rig.0[0].look_at, a);
		assert_eq!(rig.0[1].look_at, b);
	}

	#[test]
	fn reselecting_reissues_the_flight_only() {
		let mut rig = RecordingRig::default();
		let mut c = controller();
		c.on_node_click("a", Vec3::X, &mut rig);
		assert_eq!(c.on_node_click("a", Vec3::X, &mut rig), SelectionChange::Unchanged);
		assert_eq!(c.selected(), Some("a"));
		assert_eq!(rig.0.len(), 2);
	}

	#[test]
	fn background_click_leaves_camera_alone() {
		let mut rig = RecordingRig::default();
		let mut c = controller();
		assert_eq!(c.on_background_click(), SelectionChange::Unchanged);
		assert!(rig.0.is_empty());
		c.on_node_click("a", Vec3::X, &mut rig);
		assert_eq!(c.close(), SelectionChange::Changed(None));
		assert_eq!(rig.0.len(), 1);
	}

	#[test]
	fn flight_stands_off_along_the_origin_ray() {
		let mut rig = RecordingRig::default();
		let mut c = controller();
		c.on_node_click("a", Vec3::new(30.0, 40.0, 0.0), &mut rig);
		let mv = rig.0[0];
		assert!((mv.position - Vec3::new(54.0, 72.0, 0.0)).length() < 1e-4);
		assert_eq!(mv.duration_ms, 3000.0);
	}

	#[test]
	fn bridge_publishes_only_real_changes() {
		use std::sync::Arc;
		use std::sync::atomic::{AtomicUsize, Ordering};

		let owner = Owner::new();
		owner.set();
		let bridge = SelectionBridge::new(controller());
		let selected = bridge.selected();
		let runs = Arc::new(AtomicUsize::new(0));
		let counted = {
			let runs = runs.clone();
			Memo::new(move |_| {
				runs.fetch_add(1, Ordering::SeqCst);
				selected.get()
			})
		};
		let mut rig = RecordingRig::default();

		assert_eq!(counted.get_untracked(), None);
		bridge.node_click("a", Vec3::X, &mut rig);
		assert_eq!(counted.get_untracked(), Some("a".to_string()));
		let after_first = runs.load(Ordering::SeqCst);

		// same node again: the camera flies, nothing is republished
		bridge.node_click("a", Vec3::X, &mut rig);
		assert_eq!(counted.get_untracked(), Some("a".to_string()));
		assert_eq!(runs.load(Ordering::SeqCst), after_first);
		assert_eq!(rig.0.len(), 2);

		bridge.close();
		assert_eq!(selected.get_untracked(), None);
		assert_eq!(counted.get_untracked(), None);

		bridge.background_click();
		assert_eq!(selected.get_untracked(), None);
	}

	#[test]
	fn node_at_origin_is_approached_along_z() {
		assert_eq!(fly_to_position(Vec3::ZERO, 40.0), Vec3::new(0.0, 0.0, 40.0));
	}
}
