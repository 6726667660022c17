//! Recommendation inference core: candidate selection, the two scoring
//! adapters and the deterministic ranker, behind one serving facade.

pub mod candidates;
pub mod ranker;
pub mod recommender;
pub mod scoring;

pub use recommender::Recommender;
