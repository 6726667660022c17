//! Serving facade: owns the loaded dataset and model artifacts and turns
//! requests into ranked recommendation lists.

use crate::candidates::select_candidates;
use crate::ranker::{rank, DEFAULT_TOP_N};
use crate::scoring::{score_collaborative, score_content_based};
use chrono::Utc;
use recommerce_core::types::{InteractionDataset, RecommendationResponse, Strategy};
use recommerce_core::{RecError, RecResult};
use recommerce_models::{ContentPipeline, SvdModel};
use tracing::debug;
use uuid::Uuid;

/// Loaded-once serving state. Models and dataset are handed in at
/// construction and never reloaded or mutated afterwards, so a shared
/// reference can serve any number of requests.
pub struct Recommender {
    dataset: InteractionDataset,
    collaborative: Option<SvdModel>,
    content: Option<ContentPipeline>,
    default_top_n: usize,
}

impl Recommender {
    pub fn new(
        dataset: InteractionDataset,
        collaborative: Option<SvdModel>,
        content: Option<ContentPipeline>,
    ) -> Self {
        Self {
            dataset,
            collaborative,
            content,
            default_top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_default_top_n(mut self, top_n: usize) -> Self {
        self.default_top_n = top_n;
        self
    }

    /// Produce the ranked top-N unseen items for `user_id` under the given
    /// strategy.
    ///
    /// A strategy whose model is not loaded is `ModelUnavailable`; an empty
    /// interaction dataset is `DataUnavailable`. A user with no history
    /// gets the full catalog scored, and a user who has interacted with
    /// every item gets an empty list — neither is an error.
    pub fn get_recommendations(
        &self,
        strategy: Strategy,
        user_id: &str,
        top_n: Option<usize>,
    ) -> RecResult<RecommendationResponse> {
        if self.dataset.is_empty() {
            return Err(RecError::DataUnavailable(
                "interaction dataset is empty".to_string(),
            ));
        }

        let top_n = top_n.unwrap_or(self.default_top_n);
        let candidates = select_candidates(user_id, &self.dataset);
        debug!(
            user_id,
            %strategy,
            candidates = candidates.len(),
            "Selected candidate pool"
        );

        let scored = match strategy {
            Strategy::Collaborative => {
                let model = self.collaborative.as_ref().ok_or_else(|| {
                    RecError::ModelUnavailable(
                        "collaborative model is not loaded".to_string(),
                    )
                })?;
                score_collaborative(model, user_id, &candidates)
            }
            Strategy::ContentBased => {
                let pipeline = self.content.as_ref().ok_or_else(|| {
                    RecError::ModelUnavailable(
                        "content-based pipeline is not loaded".to_string(),
                    )
                })?;
                score_content_based(pipeline, &self.dataset, &candidates)?
            }
        };

        Ok(RecommendationResponse {
            request_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            strategy,
            items: rank(scored, top_n),
            generated_at: Utc::now(),
        })
    }
}
