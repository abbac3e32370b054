use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    images,
    state::AppState,
    stories::{
        dto::{
            datetime_from_ms_str, DateRangeParams, FavoritePayload, MessageResponse,
            SearchParams, StoriesResponse, StoryPayload, StoryResponse,
        },
        repo::{Story, StoryFields},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add-travel-story", post(add_story))
        .route("/get-all-stories", get(get_all_stories))
        .route("/edit-story/:id", put(edit_story))
        .route("/delete-story/:id", delete(delete_story))
        .route("/update-is-favorite/:id", put(update_is_favorite))
        .route("/search", get(search_stories))
        .route("/travel-stories/filter", get(filter_stories))
}

/// A path segment that isn't even a UUID can't name an owned story, so it
/// gets the same not-found answer as someone else's story.
fn parse_story_id(id: &str) -> Result<Uuid, ApiError> {
    id.parse::<Uuid>()
        .map_err(|_| ApiError::NotFound("Story not found.".into()))
}

#[instrument(skip(state, payload))]
pub async fn add_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<StoryPayload>,
) -> Result<(StatusCode, Json<StoryResponse>), ApiError> {
    payload.validate(true)?;
    let visited_date = payload.parsed_visited_date()?;

    let story = Story::create(
        &state.db,
        user_id,
        &StoryFields {
            title: payload.title.trim(),
            story: &payload.story,
            visited_location: payload.visited_location.trim(),
            image_url: payload.image_url.trim(),
            visited_date,
        },
    )
    .await?;

    info!(user_id = %user_id, story_id = %story.id, "story added");
    Ok((
        StatusCode::CREATED,
        Json(StoryResponse {
            story,
            message: "Story added successfully.".into(),
        }),
    ))
}

#[instrument(skip(state))]
pub async fn get_all_stories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StoriesResponse>, ApiError> {
    let stories = Story::list_by_user(&state.db, user_id).await?;
    Ok(Json(StoriesResponse { stories }))
}

#[instrument(skip(state, payload))]
pub async fn edit_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<StoryPayload>,
) -> Result<Json<StoryResponse>, ApiError> {
    let story_id = parse_story_id(&id)?;
    payload.validate(false)?;
    let visited_date = payload.parsed_visited_date()?;

    // An edit without an image keeps the story presentable.
    let image_url = if payload.image_url.trim().is_empty() {
        state.config.placeholder_image_url()
    } else {
        payload.image_url.trim().to_string()
    };

    let story = Story::update(
        &state.db,
        user_id,
        story_id,
        &StoryFields {
            title: payload.title.trim(),
            story: &payload.story,
            visited_location: payload.visited_location.trim(),
            image_url: &image_url,
            visited_date,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Story not found.".into()))?;

    info!(user_id = %user_id, story_id = %story.id, "story updated");
    Ok(Json(StoryResponse {
        story,
        message: "Story updated successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn delete_story(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let story_id = parse_story_id(&id)?;

    let image_url = Story::delete(&state.db, user_id, story_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Story not found.".into()))?;

    // Blob cleanup is best-effort and must never block or fail the response;
    // the row deletion above is already committed.
    if let Some(key) = images::services::object_key_from_url(&image_url) {
        let storage = state.storage.clone();
        tokio::spawn(async move {
            match storage.delete_object(&key).await {
                Ok(true) => debug!(key = %key, "story image deleted"),
                Ok(false) => debug!(key = %key, "story image already absent"),
                Err(e) => warn!(error = %e, key = %key, "failed to delete story image"),
            }
        });
    }

    info!(user_id = %user_id, story_id = %story_id, "story deleted");
    Ok(Json(MessageResponse {
        message: "Story deleted successfully.".into(),
    }))
}

#[instrument(skip(state, payload))]
pub async fn update_is_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<FavoritePayload>,
) -> Result<Json<StoryResponse>, ApiError> {
    let story_id = parse_story_id(&id)?;

    let story = Story::set_favorite(&state.db, user_id, story_id, payload.is_favorite)
        .await?
        .ok_or_else(|| ApiError::NotFound("Story not found.".into()))?;

    Ok(Json(StoryResponse {
        story,
        message: "Favorite status updated successfully.".into(),
    }))
}

#[instrument(skip(state))]
pub async fn search_stories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<SearchParams>,
) -> Result<Json<StoriesResponse>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::Validation("Search query is required.".into()))?;

    let stories = Story::search(&state.db, user_id, query).await?;
    Ok(Json(StoriesResponse { stories }))
}

#[instrument(skip(state))]
pub async fn filter_stories(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<DateRangeParams>,
) -> Result<Json<StoriesResponse>, ApiError> {
    let start = params
        .start_date
        .as_deref()
        .and_then(datetime_from_ms_str)
        .ok_or_else(|| {
            ApiError::Validation("startDate must be epoch milliseconds.".into())
        })?;
    let end = params
        .end_date
        .as_deref()
        .and_then(datetime_from_ms_str)
        .ok_or_else(|| ApiError::Validation("endDate must be epoch milliseconds.".into()))?;

    let stories = Story::filter_by_date_range(&state.db, user_id, start, end).await?;
    Ok(Json(StoriesResponse { stories }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_uuid_story_id_maps_to_not_found() {
        let err = parse_story_id("not-a-uuid").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert!(parse_story_id(&Uuid::new_v4().to_string()).is_ok());
    }
}
