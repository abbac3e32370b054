use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// A travel story row. Every query in this module filters on `user_id`, so a
/// story is only ever visible to its owner; "doesn't exist" and "not yours"
/// are indistinguishable by construction.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub story: String,
    pub visited_location: String,
    pub image_url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub visited_date: OffsetDateTime,
    pub is_favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Writable fields shared by create and update.
#[derive(Debug)]
pub struct StoryFields<'a> {
    pub title: &'a str,
    pub story: &'a str,
    pub visited_location: &'a str,
    pub image_url: &'a str,
    pub visited_date: OffsetDateTime,
}

/// Escapes LIKE metacharacters so a user query matches literally as a
/// substring.
pub fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

impl Story {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        fields: &StoryFields<'_>,
    ) -> sqlx::Result<Story> {
        sqlx::query_as::<_, Story>(
            r#"
            INSERT INTO travel_stories (user_id, title, story, visited_location, image_url, visited_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, title, story, visited_location, image_url,
                      visited_date, is_favorite, created_at
            "#,
        )
        .bind(user_id)
        .bind(fields.title)
        .bind(fields.story)
        .bind(fields.visited_location)
        .bind(fields.image_url)
        .bind(fields.visited_date)
        .fetch_one(db)
        .await
    }

    /// Favorites first, newest first within each partition.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            SELECT id, user_id, title, story, visited_location, image_url,
                   visited_date, is_favorite, created_at
            FROM travel_stories
            WHERE user_id = $1
            ORDER BY is_favorite DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// `None` means no story with that id is owned by `user_id`.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        story_id: Uuid,
        fields: &StoryFields<'_>,
    ) -> sqlx::Result<Option<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            UPDATE travel_stories
            SET title = $3, story = $4, visited_location = $5, image_url = $6, visited_date = $7
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, story, visited_location, image_url,
                      visited_date, is_favorite, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(fields.title)
        .bind(fields.story)
        .bind(fields.visited_location)
        .bind(fields.image_url)
        .bind(fields.visited_date)
        .fetch_optional(db)
        .await
    }

    /// Deletes an owned story, returning its image URL for blob cleanup.
    pub async fn delete(
        db: &PgPool,
        user_id: Uuid,
        story_id: Uuid,
    ) -> sqlx::Result<Option<String>> {
        sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM travel_stories
            WHERE id = $1 AND user_id = $2
            RETURNING image_url
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    pub async fn set_favorite(
        db: &PgPool,
        user_id: Uuid,
        story_id: Uuid,
        is_favorite: bool,
    ) -> sqlx::Result<Option<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            UPDATE travel_stories
            SET is_favorite = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, story, visited_location, image_url,
                      visited_date, is_favorite, created_at
            "#,
        )
        .bind(story_id)
        .bind(user_id)
        .bind(is_favorite)
        .fetch_optional(db)
        .await
    }

    /// Case-insensitive substring match over title, body and location.
    pub async fn search(db: &PgPool, user_id: Uuid, query: &str) -> sqlx::Result<Vec<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            SELECT id, user_id, title, story, visited_location, image_url,
                   visited_date, is_favorite, created_at
            FROM travel_stories
            WHERE user_id = $1
              AND (title ILIKE $2 OR story ILIKE $2 OR visited_location ILIKE $2)
            ORDER BY is_favorite DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(like_pattern(query))
        .fetch_all(db)
        .await
    }

    /// Inclusive range on `visited_date`.
    pub async fn filter_by_date_range(
        db: &PgPool,
        user_id: Uuid,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> sqlx::Result<Vec<Story>> {
        sqlx::query_as::<_, Story>(
            r#"
            SELECT id, user_id, title, story, visited_location, image_url,
                   visited_date, is_favorite, created_at
            FROM travel_stories
            WHERE user_id = $1 AND visited_date BETWEEN $2 AND $3
            ORDER BY is_favorite DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("paris"), "%paris%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("back\\slash"), "%back\\\\slash%");
    }

    #[test]
    fn story_serializes_camel_case() {
        let story = Story {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Trip".into(),
            story: "text".into(),
            visited_location: "Paris".into(),
            image_url: "http://localhost:8000/uploads/u1.jpg".into(),
            visited_date: OffsetDateTime::now_utc(),
            is_favorite: false,
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&story).unwrap();
        assert!(json.contains("\"visitedLocation\":\"Paris\""));
        assert!(json.contains("\"imageUrl\""));
        assert!(json.contains("\"isFavorite\":false"));
        assert!(json.contains("\"visitedDate\""));
    }
}
