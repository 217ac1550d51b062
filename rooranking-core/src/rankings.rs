use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;

use crate::{Database, DatabaseError, PrimaryKey, RankingData};

/// Per-user artist scores and their aggregates.
///
/// A user has at most one ranking per artist. The store's upsert primitive
/// is atomic per call, so two concurrent writes for the same pair collapse
/// into one row.
pub struct Rankings {
    db: Arc<dyn Database>,
}

#[derive(Debug, Error)]
pub enum RankingError {
    #[error("Score must be between {min} and {max}", min = Rankings::MIN_SCORE, max = Rankings::MAX_SCORE)]
    ScoreOutOfRange,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(#[from] DatabaseError),
}

/// How a year's artist scored across all users
#[derive(Debug, Clone)]
pub struct ArtistAggregate {
    pub artist_id: PrimaryKey,
    pub name: String,
    /// `None` when nobody rated the artist, never zero
    pub avg_score: Option<f64>,
    pub rating_count: usize,
}

impl Rankings {
    pub const MIN_SCORE: i32 = 1;
    pub const MAX_SCORE: i32 = 10;

    pub fn new(db: &Arc<dyn Database>) -> Self {
        Self { db: db.clone() }
    }

    /// Sets or replaces the user's score for an artist
    pub async fn set_ranking(
        &self,
        user_id: PrimaryKey,
        artist_id: PrimaryKey,
        score: i32,
    ) -> Result<RankingData, RankingError> {
        if !(Self::MIN_SCORE..=Self::MAX_SCORE).contains(&score) {
            return Err(RankingError::ScoreOutOfRange);
        }

        let ranking = self
            .db
            .upsert_ranking(user_id, artist_id, score, Utc::now())
            .await?;

        Ok(ranking)
    }

    /// Removes the user's score for an artist, if there is one
    pub async fn clear_ranking(
        &self,
        user_id: PrimaryKey,
        artist_id: PrimaryKey,
    ) -> Result<(), RankingError> {
        match self.db.delete_ranking(user_id, artist_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// The user's scores for a year, as an artist id to score map
    pub async fn user_rankings_for_year(
        &self,
        user_id: PrimaryKey,
        year: i32,
    ) -> Result<HashMap<PrimaryKey, i32>, RankingError> {
        let artists = self.db.artists_by_year(year).await?;
        let artist_ids: Vec<PrimaryKey> = artists.iter().map(|a| a.id).collect();

        let rankings = self.db.rankings_by_user(user_id).await?;

        let map = rankings
            .into_iter()
            .filter(|r| artist_ids.contains(&r.artist_id))
            .map(|r| (r.artist_id, r.score))
            .collect();

        Ok(map)
    }

    /// Rating count and average per artist of a year
    pub async fn aggregate_rankings(
        &self,
        year: i32,
    ) -> Result<Vec<ArtistAggregate>, RankingError> {
        let artists = self.db.artists_by_year(year).await?;
        let mut aggregates = Vec::with_capacity(artists.len());

        for artist in artists {
            let rankings = self.db.rankings_by_artist(artist.id).await?;

            aggregates.push(ArtistAggregate {
                artist_id: artist.id,
                name: artist.name,
                avg_score: average(&rankings),
                rating_count: rankings.len(),
            });
        }

        Ok(aggregates)
    }
}

fn average(rankings: &[RankingData]) -> Option<f64> {
    if rankings.is_empty() {
        return None;
    }

    let sum: i32 = rankings.iter().map(|r| r.score).sum();
    Some(f64::from(sum) / rankings.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Lineup, MemoryDatabase, NewUser};

    async fn setup() -> (Arc<dyn Database>, Rankings, PrimaryKey, PrimaryKey) {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let rankings = Rankings::new(&db);
        let lineup = Lineup::new(&db);

        let user = db
            .create_user(NewUser {
                username: "alice".to_string(),
                password: "not a real hash".to_string(),
                is_admin: false,
                avatar_color: "#22c55e".to_string(),
                avatar_image: None,
                years_attended: vec![],
                questionnaire: None,
                onboarding_complete: true,
            })
            .await
            .unwrap();

        lineup
            .add_artists(&["Phish".to_string()], 2025)
            .await
            .unwrap();
        let artist = lineup.artists_by_year(2025).await.unwrap()[0].id;

        (db, rankings, user.id, artist)
    }

    #[tokio::test]
    async fn scores_outside_the_range_are_rejected() {
        let (db, rankings, user, artist) = setup().await;

        for score in [0, 11, -3, 100] {
            let err = rankings.set_ranking(user, artist, score).await.unwrap_err();
            assert!(matches!(err, RankingError::ScoreOutOfRange));
        }

        assert!(db.rankings_by_user(user).await.unwrap().is_empty());

        for score in [1, 10] {
            rankings.set_ranking(user, artist, score).await.unwrap();
        }
    }

    #[tokio::test]
    async fn setting_a_ranking_twice_updates_the_single_row() {
        let (db, rankings, user, artist) = setup().await;

        let first = rankings.set_ranking(user, artist, 7).await.unwrap();
        let second = rankings.set_ranking(user, artist, 7).await.unwrap();

        let rows = db.rankings_by_user(user).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].score, 7);
        assert_eq!(first.id, second.id);
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn clearing_is_idempotent() {
        let (db, rankings, user, artist) = setup().await;

        rankings.set_ranking(user, artist, 5).await.unwrap();
        rankings.clear_ranking(user, artist).await.unwrap();
        rankings.clear_ranking(user, artist).await.unwrap();

        assert!(db.rankings_by_user(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rankings_map_is_scoped_to_the_requested_year() {
        let (db, rankings, user, artist) = setup().await;

        let lineup = Lineup::new(&db);
        lineup
            .add_artists(&["Tool".to_string()], 2024)
            .await
            .unwrap();
        let old_artist = lineup.artists_by_year(2024).await.unwrap()[0].id;

        rankings.set_ranking(user, artist, 9).await.unwrap();
        rankings.set_ranking(user, old_artist, 3).await.unwrap();

        let map = rankings.user_rankings_for_year(user, 2025).await.unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&artist), Some(&9));
    }

    #[tokio::test]
    async fn unrated_artists_aggregate_to_none_not_zero() {
        let (db, rankings, user, artist) = setup().await;

        let lineup = Lineup::new(&db);
        lineup
            .add_artists(&["Tool".to_string()], 2025)
            .await
            .unwrap();

        rankings.set_ranking(user, artist, 8).await.unwrap();

        let other_user = db
            .create_user(NewUser {
                username: "bob".to_string(),
                password: "not a real hash".to_string(),
                is_admin: false,
                avatar_color: "#3b82f6".to_string(),
                avatar_image: None,
                years_attended: vec![],
                questionnaire: None,
                onboarding_complete: true,
            })
            .await
            .unwrap();
        rankings.set_ranking(other_user.id, artist, 9).await.unwrap();

        let aggregates = rankings.aggregate_rankings(2025).await.unwrap();
        assert_eq!(aggregates.len(), 2);

        let phish = aggregates.iter().find(|a| a.name == "Phish").unwrap();
        assert_eq!(phish.rating_count, 2);
        assert_eq!(phish.avg_score, Some(8.5));

        let tool = aggregates.iter().find(|a| a.name == "Tool").unwrap();
        assert_eq!(tool.rating_count, 0);
        assert_eq!(tool.avg_score, None);
    }
}
