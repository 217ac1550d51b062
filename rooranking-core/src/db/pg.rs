use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::info;
use sqlx::error::ErrorKind;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{Error as SqlxError, PgPool, Row};

use crate::{
    ArtistData, AvatarData, Database, DatabaseError, GroupData, GroupStatus, IntoDatabaseError,
    NewArtist, NewAvatar, NewGroup, NewSession, NewUser, PrimaryKey, QuestionnaireData,
    RankingData, Result, SessionData, SettingData, UpdatedGroup, UpdatedUser, UserData,
};

/// A postgres database implementation for Roo Ranking.
///
/// Uniqueness is enforced by unique indexes, and the ranking/setting upserts
/// go through `ON CONFLICT` so the store serializes concurrent writers for
/// the same logical key.
pub struct PgDatabase {
    pool: PgPool,
}

/// Applied on connect. Every statement is idempotent, so reconnecting to an
/// existing database is safe.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        is_admin BOOLEAN NOT NULL,
        avatar_color TEXT NOT NULL,
        avatar_image TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        years_attended JSONB NOT NULL DEFAULT '[]'::jsonb,
        questionnaire JSONB,
        onboarding_complete BOOLEAN NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS sessions (
        id SERIAL PRIMARY KEY,
        token TEXT NOT NULL UNIQUE,
        user_id INTEGER NOT NULL REFERENCES users (id),
        expires_at TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
    "CREATE TABLE IF NOT EXISTS artists (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        year INTEGER NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS artists_name_year ON artists (name, year)",
    "CREATE INDEX IF NOT EXISTS artists_year ON artists (year)",
    "CREATE TABLE IF NOT EXISTS \"groups\" (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        year INTEGER NOT NULL,
        artist_ids JSONB NOT NULL DEFAULT '[]'::jsonb,
        status TEXT,
        \"order\" INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS groups_year ON \"groups\" (year)",
    "CREATE TABLE IF NOT EXISTS rankings (
        id SERIAL PRIMARY KEY,
        user_id INTEGER NOT NULL REFERENCES users (id),
        artist_id INTEGER NOT NULL REFERENCES artists (id),
        score INTEGER NOT NULL,
        updated_at TIMESTAMPTZ NOT NULL
    )",
    "CREATE UNIQUE INDEX IF NOT EXISTS rankings_user_artist ON rankings (user_id, artist_id)",
    "CREATE INDEX IF NOT EXISTS rankings_artist ON rankings (artist_id)",
    "CREATE TABLE IF NOT EXISTS settings (
        id SERIAL PRIMARY KEY,
        key TEXT NOT NULL UNIQUE,
        value JSONB NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS avatars (
        id SERIAL PRIMARY KEY,
        storage_id TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )",
];

impl PgDatabase {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| e.any())?;

        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| e.any())?;
        }

        info!("Database schema is up to date.");

        Ok(Self { pool })
    }
}

fn user_from_row(row: &PgRow) -> sqlx::Result<UserData> {
    Ok(UserData {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password: row.try_get("password")?,
        is_admin: row.try_get("is_admin")?,
        avatar_color: row.try_get("avatar_color")?,
        avatar_image: row.try_get("avatar_image")?,
        created_at: row.try_get("created_at")?,
        years_attended: row.try_get::<Json<Vec<i32>>, _>("years_attended")?.0,
        questionnaire: row
            .try_get::<Option<Json<QuestionnaireData>>, _>("questionnaire")?
            .map(|q| q.0),
        onboarding_complete: row.try_get("onboarding_complete")?,
    })
}

fn artist_from_row(row: &PgRow) -> sqlx::Result<ArtistData> {
    Ok(ArtistData {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        year: row.try_get("year")?,
    })
}

fn group_from_row(row: &PgRow) -> sqlx::Result<GroupData> {
    Ok(GroupData {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        year: row.try_get("year")?,
        artist_ids: row.try_get::<Json<Vec<PrimaryKey>>, _>("artist_ids")?.0,
        status: row
            .try_get::<Option<String>, _>("status")?
            .as_deref()
            .and_then(GroupStatus::from_str),
        order: row.try_get("order")?,
    })
}

fn ranking_from_row(row: &PgRow) -> sqlx::Result<RankingData> {
    Ok(RankingData {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        artist_id: row.try_get("artist_id")?,
        score: row.try_get("score")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn avatar_from_row(row: &PgRow) -> sqlx::Result<AvatarData> {
    Ok(AvatarData {
        id: row.try_get("id")?,
        storage_id: row.try_get("storage_id")?,
        name: row.try_get("name")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Maps a unique index violation to a conflict, anything else to internal
fn conflict_or_any(
    e: SqlxError,
    resource: &'static str,
    field: &'static str,
    value: &str,
) -> DatabaseError {
    let is_unique_violation = matches!(
        &e,
        SqlxError::Database(db_err) if matches!(db_err.kind(), ErrorKind::UniqueViolation)
    );

    if is_unique_violation {
        return DatabaseError::Conflict {
            resource,
            field,
            value: value.to_string(),
        };
    }

    e.any()
}

#[async_trait]
impl Database for PgDatabase {
    async fn check_for_admin(&self) -> Result<bool> {
        let row = sqlx::query("SELECT id FROM users WHERE is_admin = true LIMIT 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| e.any())?;

        Ok(row.is_some())
    }

    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "id"))?;

        user_from_row(&row).map_err(|e| e.any())
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        let row = sqlx::query("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("user", "username"))?;

        user_from_row(&row).map_err(|e| e.any())
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| user_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let row = sqlx::query(
            "INSERT INTO users
                (username, password, is_admin, avatar_color, avatar_image,
                 years_attended, questionnaire, onboarding_complete)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(new_user.is_admin)
        .bind(&new_user.avatar_color)
        .bind(&new_user.avatar_image)
        .bind(Json(&new_user.years_attended))
        .bind(new_user.questionnaire.as_ref().map(Json))
        .bind(new_user.onboarding_complete)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_any(e, "user", "username", &new_user.username))?;

        user_from_row(&row).map_err(|e| e.any())
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let user = self.user_by_id(updated_user.id).await?;

        let avatar_image = updated_user.avatar_image.unwrap_or(user.avatar_image);
        let questionnaire = updated_user.questionnaire.or(user.questionnaire);

        sqlx::query(
            "UPDATE users SET
                avatar_color = $1,
                avatar_image = $2,
                years_attended = $3,
                questionnaire = $4,
                onboarding_complete = $5
             WHERE id = $6",
        )
        .bind(updated_user.avatar_color.unwrap_or(user.avatar_color))
        .bind(avatar_image)
        .bind(Json(
            updated_user.years_attended.unwrap_or(user.years_attended),
        ))
        .bind(questionnaire.map(Json))
        .bind(
            updated_user
                .onboarding_complete
                .unwrap_or(user.onboarding_complete),
        )
        .bind(updated_user.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.user_by_id(updated_user.id).await
    }

    async fn update_user_password(&self, user_id: PrimaryKey, password: String) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("UPDATE users SET password = $1 WHERE id = $2")
            .bind(password)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        // Ensure user exists
        let _ = self.user_by_id(user_id).await?;

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let row = sqlx::query(
            "SELECT
                sessions.id AS session_id,
                sessions.token,
                sessions.expires_at,
                sessions.created_at AS session_created_at,
                users.*
            FROM sessions
                INNER JOIN users ON sessions.user_id = users.id
            WHERE token = $1",
        )
        .bind(token)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.not_found_or("session", "token"))?;

        let session = SessionData {
            id: row.try_get("session_id").map_err(|e| e.any())?,
            token: row.try_get("token").map_err(|e| e.any())?,
            expires_at: row.try_get("expires_at").map_err(|e| e.any())?,
            created_at: row.try_get("session_created_at").map_err(|e| e.any())?,
            user: user_from_row(&row).map_err(|e| e.any())?,
        };

        Ok(session)
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        let row = sqlx::query(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING token",
        )
        .bind(&new_session.token)
        .bind(new_session.user_id)
        .bind(new_session.expires_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_or_any(e, "session", "token", &new_session.token))?;

        let token: String = row.try_get("token").map_err(|e| e.any())?;
        self.session_by_token(&token).await
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        // Ensure session exists
        let _ = self.session_by_token(token).await?;

        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn delete_sessions_by_user(&self, user_id: PrimaryKey) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn artist_by_id(&self, artist_id: PrimaryKey) -> Result<ArtistData> {
        let row = sqlx::query("SELECT * FROM artists WHERE id = $1")
            .bind(artist_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("artist", "id"))?;

        artist_from_row(&row).map_err(|e| e.any())
    }

    async fn artist_by_name_and_year(&self, name: &str, year: i32) -> Result<ArtistData> {
        let row = sqlx::query("SELECT * FROM artists WHERE name = $1 AND year = $2")
            .bind(name)
            .bind(year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("artist", "name:year"))?;

        artist_from_row(&row).map_err(|e| e.any())
    }

    async fn artists_by_year(&self, year: i32) -> Result<Vec<ArtistData>> {
        let rows = sqlx::query("SELECT * FROM artists WHERE year = $1 ORDER BY id")
            .bind(year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| artist_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn artist_years(&self) -> Result<Vec<i32>> {
        let rows = sqlx::query("SELECT DISTINCT year FROM artists ORDER BY year DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| row.try_get("year").map_err(|e| e.any()))
            .collect()
    }

    async fn create_artist(&self, new_artist: NewArtist) -> Result<ArtistData> {
        let row = sqlx::query("INSERT INTO artists (name, year) VALUES ($1, $2) RETURNING *")
            .bind(&new_artist.name)
            .bind(new_artist.year)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                conflict_or_any(
                    e,
                    "artist",
                    "name:year",
                    &format!("{}:{}", new_artist.name, new_artist.year),
                )
            })?;

        artist_from_row(&row).map_err(|e| e.any())
    }

    async fn delete_artist(&self, artist_id: PrimaryKey) -> Result<()> {
        // Ensure artist exists
        let _ = self.artist_by_id(artist_id).await?;

        sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(artist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn group_by_id(&self, group_id: PrimaryKey) -> Result<GroupData> {
        let row = sqlx::query("SELECT * FROM \"groups\" WHERE id = $1")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("group", "id"))?;

        group_from_row(&row).map_err(|e| e.any())
    }

    async fn groups_by_year(&self, year: i32) -> Result<Vec<GroupData>> {
        let rows = sqlx::query("SELECT * FROM \"groups\" WHERE year = $1 ORDER BY \"order\"")
            .bind(year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| group_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn create_group(&self, new_group: NewGroup) -> Result<GroupData> {
        let row = sqlx::query(
            "INSERT INTO \"groups\" (name, year, artist_ids, status, \"order\")
             VALUES (
                $1, $2, $3, $4,
                (SELECT COALESCE(MAX(\"order\") + 1, 0) FROM \"groups\" WHERE year = $2)
             )
             RETURNING *",
        )
        .bind(&new_group.name)
        .bind(new_group.year)
        .bind(Json(&new_group.artist_ids))
        .bind(new_group.status.map(|s| s.as_str()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        group_from_row(&row).map_err(|e| e.any())
    }

    async fn update_group(&self, updated_group: UpdatedGroup) -> Result<GroupData> {
        // Ensure group exists
        let _ = self.group_by_id(updated_group.id).await?;

        sqlx::query(
            "UPDATE \"groups\" SET
                name = $1,
                artist_ids = $2,
                status = $3
             WHERE id = $4",
        )
        .bind(&updated_group.name)
        .bind(Json(&updated_group.artist_ids))
        .bind(updated_group.status.map(|s| s.as_str()))
        .bind(updated_group.id)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.group_by_id(updated_group.id).await
    }

    async fn delete_group(&self, group_id: PrimaryKey) -> Result<()> {
        // Ensure group exists
        let _ = self.group_by_id(group_id).await?;

        sqlx::query("DELETE FROM \"groups\" WHERE id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn clear_group_status(&self, year: i32, status: GroupStatus) -> Result<()> {
        sqlx::query("UPDATE \"groups\" SET status = NULL WHERE year = $1 AND status = $2")
            .bind(year)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn prune_artist_from_groups(&self, artist_id: PrimaryKey) -> Result<()> {
        let rows = sqlx::query("SELECT * FROM \"groups\"")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        for row in &rows {
            let group = group_from_row(row).map_err(|e| e.any())?;

            if !group.artist_ids.contains(&artist_id) {
                continue;
            }

            let pruned: Vec<PrimaryKey> = group
                .artist_ids
                .into_iter()
                .filter(|id| *id != artist_id)
                .collect();

            sqlx::query("UPDATE \"groups\" SET artist_ids = $1 WHERE id = $2")
                .bind(Json(&pruned))
                .bind(group.id)
                .execute(&self.pool)
                .await
                .map_err(|e| e.any())?;
        }

        Ok(())
    }

    async fn upsert_ranking(
        &self,
        user_id: PrimaryKey,
        artist_id: PrimaryKey,
        score: i32,
        updated_at: DateTime<Utc>,
    ) -> Result<RankingData> {
        let row = sqlx::query(
            "INSERT INTO rankings (user_id, artist_id, score, updated_at)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id, artist_id)
                DO UPDATE SET score = EXCLUDED.score, updated_at = EXCLUDED.updated_at
             RETURNING *",
        )
        .bind(user_id)
        .bind(artist_id)
        .bind(score)
        .bind(updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.any())?;

        ranking_from_row(&row).map_err(|e| e.any())
    }

    async fn delete_ranking(&self, user_id: PrimaryKey, artist_id: PrimaryKey) -> Result<()> {
        let result = sqlx::query("DELETE FROM rankings WHERE user_id = $1 AND artist_id = $2")
            .bind(user_id)
            .bind(artist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound {
                resource: "ranking",
                identifier: "user:artist",
            });
        }

        Ok(())
    }

    async fn rankings_by_user(&self, user_id: PrimaryKey) -> Result<Vec<RankingData>> {
        let rows = sqlx::query("SELECT * FROM rankings WHERE user_id = $1")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| ranking_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<Vec<RankingData>> {
        let rows = sqlx::query("SELECT * FROM rankings WHERE artist_id = $1")
            .bind(artist_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| ranking_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn delete_rankings_by_user(&self, user_id: PrimaryKey) -> Result<()> {
        sqlx::query("DELETE FROM rankings WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn delete_rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<()> {
        sqlx::query("DELETE FROM rankings WHERE artist_id = $1")
            .bind(artist_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }

    async fn setting_by_key(&self, key: &str) -> Result<SettingData> {
        let row = sqlx::query("SELECT * FROM settings WHERE key = $1")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("setting", "key"))?;

        Ok(SettingData {
            id: row.try_get("id").map_err(|e| e.any())?,
            key: row.try_get("key").map_err(|e| e.any())?,
            value: row.try_get("value").map_err(|e| e.any())?,
        })
    }

    async fn upsert_setting(&self, key: &str, value: serde_json::Value) -> Result<SettingData> {
        sqlx::query(
            "INSERT INTO settings (key, value)
             VALUES ($1, $2)
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await
        .map_err(|e| e.any())?;

        self.setting_by_key(key).await
    }

    async fn avatar_by_id(&self, avatar_id: PrimaryKey) -> Result<AvatarData> {
        let row = sqlx::query("SELECT * FROM avatars WHERE id = $1")
            .bind(avatar_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.not_found_or("avatar", "id"))?;

        avatar_from_row(&row).map_err(|e| e.any())
    }

    async fn list_avatars(&self) -> Result<Vec<AvatarData>> {
        let rows = sqlx::query("SELECT * FROM avatars ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.any())?;

        rows.iter()
            .map(|row| avatar_from_row(row).map_err(|e| e.any()))
            .collect()
    }

    async fn create_avatar(&self, new_avatar: NewAvatar) -> Result<AvatarData> {
        let row = sqlx::query("INSERT INTO avatars (storage_id, name) VALUES ($1, $2) RETURNING *")
            .bind(&new_avatar.storage_id)
            .bind(&new_avatar.name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.any())?;

        avatar_from_row(&row).map_err(|e| e.any())
    }

    async fn update_avatar_name(&self, avatar_id: PrimaryKey, name: String) -> Result<AvatarData> {
        // Ensure avatar exists
        let _ = self.avatar_by_id(avatar_id).await?;

        sqlx::query("UPDATE avatars SET name = $1 WHERE id = $2")
            .bind(name)
            .bind(avatar_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())?;

        self.avatar_by_id(avatar_id).await
    }

    async fn delete_avatar(&self, avatar_id: PrimaryKey) -> Result<()> {
        // Ensure avatar exists
        let _ = self.avatar_by_id(avatar_id).await?;

        sqlx::query("DELETE FROM avatars WHERE id = $1")
            .bind(avatar_id)
            .execute(&self.pool)
            .await
            .map_err(|e| e.any())
            .map(|_| ())
    }
}

impl IntoDatabaseError for SqlxError {
    fn any(self) -> DatabaseError {
        DatabaseError::Internal(Box::new(self))
    }

    fn not_found_or(self, resource: &'static str, identifier: &'static str) -> DatabaseError {
        match self {
            SqlxError::RowNotFound => DatabaseError::NotFound {
                resource,
                identifier,
            },
            e => Self::any(e),
        }
    }
}
