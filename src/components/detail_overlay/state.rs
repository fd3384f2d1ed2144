use crate::data::GraphNode;

/// Slide-in/out animation length; must match `.detail-overlay` in the stylesheet.
pub const TRANSITION_MS: u32 = 350;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayPhase {
	#[default]
	Closed,
	Opening,
	Open,
	Closing,
}

impl OverlayPhase {
	pub fn class(self) -> &'static str {
		match self {
			OverlayPhase::Closed => "closed",
			OverlayPhase::Opening => "opening",
			OverlayPhase::Open => "open",
			OverlayPhase::Closing => "closing",
		}
	}
}

/// What the overlay shows and where it is in its animation.
///
/// Every transition bumps `generation`; a settle carrying an older generation
/// belongs to an interrupted animation and is dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayState {
	phase: OverlayPhase,
	node: Option<GraphNode>,
	generation: u64,
}

impl OverlayState {
	pub fn phase(&self) -> OverlayPhase {
		self.phase
	}

	/// The node on display. Kept while closing so the exit animation has
	/// something to slide out.
	pub fn node(&self) -> Option<&GraphNode> {
		self.node.as_ref()
	}

	pub fn is_visible(&self) -> bool {
		self.phase != OverlayPhase::Closed
	}

	/// Applies a selection change. Returns the generation to settle once the
	/// animation finishes, or `None` when nothing moved.
	pub fn select(&mut self, node: Option<GraphNode>) -> Option<u64> {
		match node {
			Some(node) => {
				let showing = matches!(self.phase, OverlayPhase::Opening | OverlayPhase::Open);
				if showing && self.node.as_ref().is_some_and(|n| n.id == node.id) {
					return None;
				}
				self.node = Some(node);
				self.phase = OverlayPhase::Opening;
			}
			None => {
				if matches!(self.phase, OverlayPhase::Closed | OverlayPhase::Closing) {
					return None;
				}
				self.phase = OverlayPhase::Closing;
			}
		}
		self.generation += 1;
		Some(self.generation)
	}

	/// Finishes the animation started at `generation`. Returns whether the
	/// phase changed.
	pub fn settle(&mut self, generation: u64) -> bool {
		if generation != self.generation {
			return false;
		}
		match self.phase {
			OverlayPhase::Opening => self.phase = OverlayPhase::Open,
			OverlayPhase::Closing => {
				self.phase = OverlayPhase::Closed;
				self.node = None;
			}
			OverlayPhase::Closed | OverlayPhase::Open => return false,
		}
		true
	}
}

/// The single call to action shown under a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrimaryAction {
	/// Opens in a new tab.
	External(String),
	/// Another node's page.
	Internal(String),
	/// The node's own page.
	ReadMore(String),
}

impl PrimaryAction {
	pub fn for_node(node: &GraphNode) -> Self {
		match node.link.as_deref() {
			Some(link) if link.starts_with("http://") || link.starts_with("https://") => {
				PrimaryAction::External(link.to_string())
			}
			Some(link) => PrimaryAction::Internal(link.to_string()),
			None => PrimaryAction::ReadMore(node.id.clone()),
		}
	}

	pub fn href(&self) -> String {
		match self {
			PrimaryAction::External(url) => url.clone(),
			PrimaryAction::Internal(id) | PrimaryAction::ReadMore(id) => format!("/node/{id}"),
		}
	}

	pub fn label(&self) -> &'static str {
		match self {
			PrimaryAction::External(_) => "External Link",
			PrimaryAction::Internal(_) => "View Project",
			PrimaryAction::ReadMore(_) => "Read More",
		}
	}

	pub fn is_external(&self) -> bool {
		matches!(self, PrimaryAction::External(_))
	}
}
