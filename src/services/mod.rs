pub mod analysis;
pub mod candidate_scorer;
pub mod feel_gap;
pub mod gap_detector;
pub mod health_scorer;
pub mod prose;
pub mod rotation_analyzer;
pub mod selector;
pub mod shortlist;
pub mod tier_classifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use analysis::{analyze_rotation, assemble_response, RotationReport};
