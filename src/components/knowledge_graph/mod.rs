//! Interactive 3D view of the knowledge graph.

mod camera;
mod component;
mod compositor;
mod interaction;
mod layout;
mod render;
mod state;
mod texture;
mod theme;
mod visuals;

pub use component::KnowledgeGraph;
pub use interaction::{InteractionController, SelectionBridge};
pub use theme::{SceneConfig, ThemePreset};
pub use visuals::node_color;
