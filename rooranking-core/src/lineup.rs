use std::sync::Arc;

use crate::{
    ArtistData, Database, DatabaseError, GroupData, NewArtist, NewGroup, PrimaryKey, UpdatedGroup,
};

/// Artists and their groupings, per festival year.
///
/// Groups hold weak references to artists: deleting an artist prunes its id
/// from every member list instead of touching the groups themselves.
pub struct Lineup {
    db: Arc<dyn Database>,
}

/// The outcome of a bulk artist add. Both partitions preserve the input
/// order of the names they contain.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AddedArtists {
    pub added: Vec<String>,
    pub skipped: Vec<String>,
}

impl Lineup {
    pub fn new(db: &Arc<dyn Database>) -> Self {
        Self { db: db.clone() }
    }

    /// Adds a batch of artist names to a year. Blank names are dropped,
    /// names already present for the year are reported as skipped.
    pub async fn add_artists(
        &self,
        names: &[String],
        year: i32,
    ) -> Result<AddedArtists, DatabaseError> {
        let mut result = AddedArtists::default();

        for name in names {
            let trimmed = name.trim();

            if trimmed.is_empty() {
                continue;
            }

            match self.db.artist_by_name_and_year(trimmed, year).await {
                Ok(_) => {
                    result.skipped.push(trimmed.to_string());
                    continue;
                }
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }

            let created = self
                .db
                .create_artist(NewArtist {
                    name: trimmed.to_string(),
                    year,
                })
                .await;

            match created {
                Ok(_) => result.added.push(trimmed.to_string()),
                // Someone else inserted the same name in the meantime
                Err(DatabaseError::Conflict { .. }) => result.skipped.push(trimmed.to_string()),
                Err(e) => return Err(e),
            }
        }

        Ok(result)
    }

    pub async fn artist_by_id(&self, artist_id: PrimaryKey) -> Result<ArtistData, DatabaseError> {
        self.db.artist_by_id(artist_id).await
    }

    pub async fn artists_by_year(&self, year: i32) -> Result<Vec<ArtistData>, DatabaseError> {
        self.db.artists_by_year(year).await
    }

    /// All years that have artists, most recent first
    pub async fn years_with_artists(&self) -> Result<Vec<i32>, DatabaseError> {
        self.db.artist_years().await
    }

    /// Deletes an artist along with everything referencing it. Dependents go
    /// first, so no ranking or group member list ever points at a deleted
    /// artist id.
    pub async fn delete_artist(&self, artist_id: PrimaryKey) -> Result<(), DatabaseError> {
        // Ensure artist exists before touching dependents
        let _ = self.db.artist_by_id(artist_id).await?;

        self.db.delete_rankings_by_artist(artist_id).await?;
        self.db.prune_artist_from_groups(artist_id).await?;
        self.db.delete_artist(artist_id).await
    }

    pub async fn group_by_id(&self, group_id: PrimaryKey) -> Result<GroupData, DatabaseError> {
        self.db.group_by_id(group_id).await
    }

    /// Groups of a year in their insertion order
    pub async fn groups_by_year(&self, year: i32) -> Result<Vec<GroupData>, DatabaseError> {
        self.db.groups_by_year(year).await
    }

    /// Creates a group at the end of the year's ordering. Assigning a status
    /// first clears it from whichever group of the year held it, keeping at
    /// most one `current` and one `next` per year.
    pub async fn create_group(&self, new_group: NewGroup) -> Result<GroupData, DatabaseError> {
        if let Some(status) = new_group.status {
            self.db.clear_group_status(new_group.year, status).await?;
        }

        self.db.create_group(new_group).await
    }

    /// Replaces a group's name, members, and status, with the same status
    /// exclusivity rule as [Self::create_group]
    pub async fn update_group(&self, updated_group: UpdatedGroup) -> Result<GroupData, DatabaseError> {
        let group = self.db.group_by_id(updated_group.id).await?;

        if let Some(status) = updated_group.status {
            self.db.clear_group_status(group.year, status).await?;
        }

        self.db.update_group(updated_group).await
    }

    pub async fn delete_group(&self, group_id: PrimaryKey) -> Result<(), DatabaseError> {
        self.db.delete_group(group_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GroupStatus, MemoryDatabase, NewUser};
    use chrono::Utc;

    fn setup() -> (Arc<dyn Database>, Lineup) {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        let lineup = Lineup::new(&db);
        (db, lineup)
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|n| n.to_string()).collect()
    }

    #[tokio::test]
    async fn bulk_add_partitions_preserve_input_order() {
        let (_, lineup) = setup();

        lineup
            .add_artists(&names(&["Phish", "Tool"]), 2025)
            .await
            .unwrap();

        let result = lineup
            .add_artists(
                &names(&["  Hozier ", "Phish", "", "Doechii", "Tool", "   "]),
                2025,
            )
            .await
            .unwrap();

        assert_eq!(result.added, vec!["Hozier", "Doechii"]);
        assert_eq!(result.skipped, vec!["Phish", "Tool"]);
    }

    #[tokio::test]
    async fn same_name_in_another_year_is_added() {
        let (_, lineup) = setup();

        lineup.add_artists(&names(&["Phish"]), 2024).await.unwrap();
        let result = lineup.add_artists(&names(&["Phish"]), 2025).await.unwrap();

        assert_eq!(result.added, vec!["Phish"]);
        assert!(result.skipped.is_empty());
    }

    #[tokio::test]
    async fn deleting_an_artist_cascades_to_rankings_and_groups() {
        let (db, lineup) = setup();

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
            .add_artists(&names(&["Phish", "Tool"]), 2025)
            .await
            .unwrap();
        let artists = lineup.artists_by_year(2025).await.unwrap();
        let (phish, tool) = (artists[0].id, artists[1].id);

        db.upsert_ranking(user.id, phish, 9, Utc::now()).await.unwrap();
        db.upsert_ranking(user.id, tool, 5, Utc::now()).await.unwrap();

        let group = lineup
            .create_group(NewGroup {
                name: "BALI 1".to_string(),
                year: 2025,
                artist_ids: vec![phish, tool],
                status: None,
            })
            .await
            .unwrap();

        lineup.delete_artist(phish).await.unwrap();

        assert!(db.rankings_by_artist(phish).await.unwrap().is_empty());
        assert_eq!(lineup.group_by_id(group.id).await.unwrap().artist_ids, vec![tool]);
        assert!(lineup.artist_by_id(phish).await.is_err());

        // The other artist is untouched
        assert_eq!(db.rankings_by_artist(tool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn a_year_holds_at_most_one_current_group() {
        let (_, lineup) = setup();

        let a = lineup
            .create_group(NewGroup {
                name: "A".to_string(),
                year: 2025,
                artist_ids: vec![],
                status: Some(GroupStatus::Current),
            })
            .await
            .unwrap();

        let b = lineup
            .create_group(NewGroup {
                name: "B".to_string(),
                year: 2025,
                artist_ids: vec![],
                status: None,
            })
            .await
            .unwrap();

        lineup
            .update_group(UpdatedGroup {
                id: b.id,
                name: "B".to_string(),
                artist_ids: vec![],
                status: Some(GroupStatus::Current),
            })
            .await
            .unwrap();

        assert_eq!(lineup.group_by_id(a.id).await.unwrap().status, None);
        assert_eq!(
            lineup.group_by_id(b.id).await.unwrap().status,
            Some(GroupStatus::Current)
        );

        let current: Vec<_> = lineup
            .groups_by_year(2025)
            .await
            .unwrap()
            .into_iter()
            .filter(|g| g.status == Some(GroupStatus::Current))
            .collect();
        assert_eq!(current.len(), 1);
    }

    #[tokio::test]
    async fn statuses_are_scoped_to_their_year() {
        let (_, lineup) = setup();

        let last_year = lineup
            .create_group(NewGroup {
                name: "A".to_string(),
                year: 2024,
                artist_ids: vec![],
                status: Some(GroupStatus::Current),
            })
            .await
            .unwrap();

        lineup
            .create_group(NewGroup {
                name: "B".to_string(),
                year: 2025,
                artist_ids: vec![],
                status: Some(GroupStatus::Current),
            })
            .await
            .unwrap();

        assert_eq!(
            lineup.group_by_id(last_year.id).await.unwrap().status,
            Some(GroupStatus::Current)
        );
    }
}
