pub mod detail_overlay;
pub mod knowledge_graph;
pub mod markdown;
