//! HTTP surface for the query side.
//!
//! A thin layer over `query`: it validates the `n` parameter and serializes
//! the ranked stories. State comes in through `Extension` so tests can call
//! the handlers directly.

use crate::query;
use crate::snapshot_store::SnapshotStore;
use crate::types::{MAX_BEST_STORIES, RankedStory};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct BestStoriesParams {
    n: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    stories: usize,
}

pub fn router(store: Arc<SnapshotStore>) -> Router {
    Router::new()
        .route("/api/beststories", get(best_stories))
        .route("/healthz", get(health))
        .layer(Extension(store))
}

/// GET /api/beststories?n=25
///
/// Up to `n` stories ordered by descending score. Serves an empty list
/// until the first refresh cycle publishes.
async fn best_stories(
    Query(params): Query<BestStoriesParams>,
    Extension(store): Extension<Arc<SnapshotStore>>,
) -> Result<Json<Vec<RankedStory>>, (StatusCode, Json<ErrorResponse>)> {
    let n = match params.n {
        Some(n) if (1..=MAX_BEST_STORIES).contains(&n) => n,
        Some(n) => {
            warn!(n, "Rejecting out-of-range story count");
            return Err(bad_request(format!(
                "n must be between 1 and {MAX_BEST_STORIES}"
            )));
        }
        None => return Err(bad_request("query parameter n is required".to_string())),
    };

    Ok(Json(query::best_stories(&store, n)))
}

/// GET /healthz
async fn health(Extension(store): Extension<Arc<SnapshotStore>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        stories: store.current().len(),
    })
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error: message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story_fetcher::test_utils::FakeFetcher;

    fn store_with_ids(ids: &[u64]) -> Arc<SnapshotStore> {
        let store = Arc::new(SnapshotStore::new());
        store.publish(ids.iter().map(|&id| FakeFetcher::story(id)).collect());
        store
    }

    async fn call(
        store: &Arc<SnapshotStore>,
        n: Option<usize>,
    ) -> Result<Vec<RankedStory>, StatusCode> {
        match best_stories(Query(BestStoriesParams { n }), Extension(Arc::clone(store))).await {
            Ok(Json(stories)) => Ok(stories),
            Err((status, _)) => Err(status),
        }
    }

    // ------------------------------------------------------------------------
    // GET /api/beststories
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn serves_the_top_n_by_score() {
        let store = store_with_ids(&[3, 30, 300]);

        let stories = call(&store, Some(2)).await.unwrap();

        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "story-300");
        assert_eq!(stories[1].title, "story-30");
    }

    #[tokio::test]
    async fn empty_snapshot_is_a_valid_empty_response() {
        let store = Arc::new(SnapshotStore::new());

        let stories = call(&store, Some(25)).await.unwrap();

        assert!(stories.is_empty());
    }

    #[tokio::test]
    async fn missing_n_is_a_bad_request() {
        let store = store_with_ids(&[1]);

        let status = call(&store, None).await.unwrap_err();

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn out_of_range_n_is_a_bad_request() {
        let store = store_with_ids(&[1]);

        assert_eq!(call(&store, Some(0)).await.unwrap_err(), StatusCode::BAD_REQUEST);
        assert_eq!(call(&store, Some(201)).await.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn boundary_values_of_n_are_accepted() {
        let store = store_with_ids(&[1, 2]);

        assert_eq!(call(&store, Some(1)).await.unwrap().len(), 1);
        assert_eq!(call(&store, Some(200)).await.unwrap().len(), 2);
    }

    // ------------------------------------------------------------------------
    // GET /healthz
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn health_reports_the_snapshot_size() {
        let store = store_with_ids(&[1, 2, 3]);

        let Json(body) = health(Extension(store)).await;

        assert_eq!(body.stories, 3);
    }
}
