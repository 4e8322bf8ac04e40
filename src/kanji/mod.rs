mod graph;
mod index;
mod load;
mod parse;
mod tier;

pub use graph::{CharacterNode, CompositionEdge, CompositionGraph, DualGraph, build_dual_graph};
pub use index::CompositionIndex;
pub use load::{CharacterData, load_character_data};
pub use parse::SearchEntry;
pub use tier::{Tier, TierLists};
