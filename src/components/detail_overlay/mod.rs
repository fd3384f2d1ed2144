//! Side panel for the node currently selected in the graph.

mod component;
mod state;

pub use component::DetailOverlay;
