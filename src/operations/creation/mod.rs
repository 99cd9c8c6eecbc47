mod circle_factory;
mod edge_factory;
mod seq_factory;
mod svg;

pub use circle_factory::CircleEdgeFactory;
pub use edge_factory::EdgeFactory;
pub use seq_factory::EdgeSeqFactory;
