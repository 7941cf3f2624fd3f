// Cleaning stages, applied in this order: dedup, normalize, fill, prune

pub mod dedup;
pub mod fill;
pub mod normalize;
pub mod prune;

pub use dedup::{DedupOutcome, Deduplicable, Deduplicator, DuplicateKey};
pub use fill::{FillOutcome, NullFiller};
pub use normalize::{NormalizeOutcome, Normalizer};
pub use prune::{PruneOutcome, RowPruner};
