use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::{
    ArtistData, AvatarData, Database, DatabaseError, GroupData, GroupStatus, NewArtist, NewAvatar,
    NewGroup, NewSession, NewUser, PrimaryKey, RankingData, Result, SessionData, SettingData,
    UpdatedGroup, UpdatedUser, UserData,
};

/// An in-memory database implementation for Roo Ranking.
///
/// Used by tests and by servers running without a configured Postgres
/// instance. A single lock guards all collections, so every mutating call is
/// atomic from the caller's perspective, including the lookup-then-write
/// upserts.
#[derive(Default)]
pub struct MemoryDatabase {
    state: RwLock<Collections>,
}

#[derive(Debug, Clone)]
struct SessionRow {
    id: PrimaryKey,
    token: String,
    user_id: PrimaryKey,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Collections {
    last_id: PrimaryKey,
    users: BTreeMap<PrimaryKey, UserData>,
    sessions: BTreeMap<PrimaryKey, SessionRow>,
    artists: BTreeMap<PrimaryKey, ArtistData>,
    groups: BTreeMap<PrimaryKey, GroupData>,
    rankings: BTreeMap<PrimaryKey, RankingData>,
    settings: BTreeMap<PrimaryKey, SettingData>,
    avatars: BTreeMap<PrimaryKey, AvatarData>,
}

impl Collections {
    fn allocate_id(&mut self) -> PrimaryKey {
        self.last_id += 1;
        self.last_id
    }

    fn session_with_user(&self, row: &SessionRow) -> Result<SessionData> {
        let user = self
            .users
            .get(&row.user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        Ok(SessionData {
            id: row.id,
            token: row.token.clone(),
            expires_at: row.expires_at,
            created_at: row.created_at,
            user,
        })
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn check_for_admin(&self) -> Result<bool> {
        let state = self.state.read();
        Ok(state.users.values().any(|u| u.is_admin))
    }

    async fn user_by_id(&self, user_id: PrimaryKey) -> Result<UserData> {
        self.state
            .read()
            .users
            .get(&user_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })
    }

    async fn user_by_username(&self, username: &str) -> Result<UserData> {
        self.state
            .read()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "username",
            })
    }

    async fn list_users(&self) -> Result<Vec<UserData>> {
        Ok(self.state.read().users.values().cloned().collect())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<UserData> {
        let mut state = self.state.write();

        if state.users.values().any(|u| u.username == new_user.username) {
            return Err(DatabaseError::Conflict {
                resource: "user",
                field: "username",
                value: new_user.username,
            });
        }

        let id = state.allocate_id();
        let user = UserData {
            id,
            username: new_user.username,
            password: new_user.password,
            is_admin: new_user.is_admin,
            avatar_color: new_user.avatar_color,
            avatar_image: new_user.avatar_image,
            created_at: Utc::now(),
            years_attended: new_user.years_attended,
            questionnaire: new_user.questionnaire,
            onboarding_complete: new_user.onboarding_complete,
        };

        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData> {
        let mut state = self.state.write();
        let user = state
            .users
            .get_mut(&updated_user.id)
            .ok_or(DatabaseError::NotFound {
                resource: "user",
                identifier: "id",
            })?;

        if let Some(color) = updated_user.avatar_color {
            user.avatar_color = color;
        }
        if let Some(image) = updated_user.avatar_image {
            user.avatar_image = image;
        }
        if let Some(years) = updated_user.years_attended {
            user.years_attended = years;
        }
        if let Some(questionnaire) = updated_user.questionnaire {
            user.questionnaire = Some(questionnaire);
        }
        if let Some(complete) = updated_user.onboarding_complete {
            user.onboarding_complete = complete;
        }

        Ok(user.clone())
    }

    async fn update_user_password(&self, user_id: PrimaryKey, password: String) -> Result<()> {
        let mut state = self.state.write();
        let user = state.users.get_mut(&user_id).ok_or(DatabaseError::NotFound {
            resource: "user",
            identifier: "id",
        })?;

        user.password = password;
        Ok(())
    }

    async fn delete_user(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();

        state.users.remove(&user_id).ok_or(DatabaseError::NotFound {
            resource: "user",
            identifier: "id",
        })?;

        Ok(())
    }

    async fn session_by_token(&self, token: &str) -> Result<SessionData> {
        let state = self.state.read();
        let row = state
            .sessions
            .values()
            .find(|s| s.token == token)
            .ok_or(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            })?;

        state.session_with_user(row)
    }

    async fn create_session(&self, new_session: NewSession) -> Result<SessionData> {
        let mut state = self.state.write();

        if state.sessions.values().any(|s| s.token == new_session.token) {
            return Err(DatabaseError::Conflict {
                resource: "session",
                field: "token",
                value: new_session.token,
            });
        }

        let id = state.allocate_id();
        let row = SessionRow {
            id,
            token: new_session.token,
            user_id: new_session.user_id,
            expires_at: new_session.expires_at,
            created_at: Utc::now(),
        };

        let session = state.session_with_user(&row)?;
        state.sessions.insert(id, row);

        Ok(session)
    }

    async fn delete_session_by_token(&self, token: &str) -> Result<()> {
        let mut state = self.state.write();
        let id = state
            .sessions
            .values()
            .find(|s| s.token == token)
            .map(|s| s.id)
            .ok_or(DatabaseError::NotFound {
                resource: "session",
                identifier: "token",
            })?;

        state.sessions.remove(&id);
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();
        state.sessions.retain(|_, s| s.user_id != user_id);
        Ok(())
    }

    async fn artist_by_id(&self, artist_id: PrimaryKey) -> Result<ArtistData> {
        self.state
            .read()
            .artists
            .get(&artist_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "artist",
                identifier: "id",
            })
    }

    async fn artist_by_name_and_year(&self, name: &str, year: i32) -> Result<ArtistData> {
        self.state
            .read()
            .artists
            .values()
            .find(|a| a.name == name && a.year == year)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "artist",
                identifier: "name:year",
            })
    }

    async fn artists_by_year(&self, year: i32) -> Result<Vec<ArtistData>> {
        Ok(self
            .state
            .read()
            .artists
            .values()
            .filter(|a| a.year == year)
            .cloned()
            .collect())
    }

    async fn artist_years(&self) -> Result<Vec<i32>> {
        let state = self.state.read();
        let mut years: Vec<i32> = state.artists.values().map(|a| a.year).collect();

        years.sort_unstable();
        years.dedup();
        years.reverse();

        Ok(years)
    }

    async fn create_artist(&self, new_artist: NewArtist) -> Result<ArtistData> {
        let mut state = self.state.write();

        let exists = state
            .artists
            .values()
            .any(|a| a.name == new_artist.name && a.year == new_artist.year);

        if exists {
            return Err(DatabaseError::Conflict {
                resource: "artist",
                field: "name:year",
                value: format!("{}:{}", new_artist.name, new_artist.year),
            });
        }

        let id = state.allocate_id();
        let artist = ArtistData {
            id,
            name: new_artist.name,
            year: new_artist.year,
        };

        state.artists.insert(id, artist.clone());
        Ok(artist)
    }

    async fn delete_artist(&self, artist_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();

        state
            .artists
            .remove(&artist_id)
            .ok_or(DatabaseError::NotFound {
                resource: "artist",
                identifier: "id",
            })?;

        Ok(())
    }

    async fn group_by_id(&self, group_id: PrimaryKey) -> Result<GroupData> {
        self.state
            .read()
            .groups
            .get(&group_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "group",
                identifier: "id",
            })
    }

    async fn groups_by_year(&self, year: i32) -> Result<Vec<GroupData>> {
        let mut groups: Vec<GroupData> = self
            .state
            .read()
            .groups
            .values()
            .filter(|g| g.year == year)
            .cloned()
            .collect();

        groups.sort_by_key(|g| g.order);
        Ok(groups)
    }

    async fn create_group(&self, new_group: NewGroup) -> Result<GroupData> {
        let mut state = self.state.write();

        let max_order = state
            .groups
            .values()
            .filter(|g| g.year == new_group.year)
            .map(|g| g.order)
            .max()
            .unwrap_or(-1);

        let id = state.allocate_id();
        let group = GroupData {
            id,
            name: new_group.name,
            year: new_group.year,
            artist_ids: new_group.artist_ids,
            status: new_group.status,
            order: max_order + 1,
        };

        state.groups.insert(id, group.clone());
        Ok(group)
    }

    async fn update_group(&self, updated_group: UpdatedGroup) -> Result<GroupData> {
        let mut state = self.state.write();
        let group = state
            .groups
            .get_mut(&updated_group.id)
            .ok_or(DatabaseError::NotFound {
                resource: "group",
                identifier: "id",
            })?;

        group.name = updated_group.name;
        group.artist_ids = updated_group.artist_ids;
        group.status = updated_group.status;

        Ok(group.clone())
    }

    async fn delete_group(&self, group_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();

        state.groups.remove(&group_id).ok_or(DatabaseError::NotFound {
            resource: "group",
            identifier: "id",
        })?;

        Ok(())
    }

    async fn clear_group_status(&self, year: i32, status: GroupStatus) -> Result<()> {
        let mut state = self.state.write();

        for group in state.groups.values_mut() {
            if group.year == year && group.status == Some(status) {
                group.status = None;
            }
        }

        Ok(())
    }

    async fn prune_artist_from_groups(&self, artist_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();

        for group in state.groups.values_mut() {
            group.artist_ids.retain(|id| *id != artist_id);
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
        let mut state = self.state.write();

        let existing = state
            .rankings
            .values_mut()
            .find(|r| r.user_id == user_id && r.artist_id == artist_id);

        if let Some(ranking) = existing {
            ranking.score = score;
            ranking.updated_at = updated_at;
            return Ok(ranking.clone());
        }

        let id = state.allocate_id();
        let ranking = RankingData {
            id,
            user_id,
            artist_id,
            score,
            updated_at,
        };

        state.rankings.insert(id, ranking.clone());
        Ok(ranking)
    }

    async fn delete_ranking(&self, user_id: PrimaryKey, artist_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();
        let id = state
            .rankings
            .values()
            .find(|r| r.user_id == user_id && r.artist_id == artist_id)
            .map(|r| r.id)
            .ok_or(DatabaseError::NotFound {
                resource: "ranking",
                identifier: "user:artist",
            })?;

        state.rankings.remove(&id);
        Ok(())
    }

    async fn rankings_by_user(&self, user_id: PrimaryKey) -> Result<Vec<RankingData>> {
        Ok(self
            .state
            .read()
            .rankings
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<Vec<RankingData>> {
        Ok(self
            .state
            .read()
            .rankings
            .values()
            .filter(|r| r.artist_id == artist_id)
            .cloned()
            .collect())
    }

    async fn delete_rankings_by_user(&self, user_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();
        state.rankings.retain(|_, r| r.user_id != user_id);
        Ok(())
    }

    async fn delete_rankings_by_artist(&self, artist_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();
        state.rankings.retain(|_, r| r.artist_id != artist_id);
        Ok(())
    }

    async fn setting_by_key(&self, key: &str) -> Result<SettingData> {
        self.state
            .read()
            .settings
            .values()
            .find(|s| s.key == key)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "setting",
                identifier: "key",
            })
    }

    async fn upsert_setting(&self, key: &str, value: serde_json::Value) -> Result<SettingData> {
        let mut state = self.state.write();

        let existing = state.settings.values_mut().find(|s| s.key == key);

        if let Some(setting) = existing {
            setting.value = value;
            return Ok(setting.clone());
        }

        let id = state.allocate_id();
        let setting = SettingData {
            id,
            key: key.to_string(),
            value,
        };

        state.settings.insert(id, setting.clone());
        Ok(setting)
    }

    async fn avatar_by_id(&self, avatar_id: PrimaryKey) -> Result<AvatarData> {
        self.state
            .read()
            .avatars
            .get(&avatar_id)
            .cloned()
            .ok_or(DatabaseError::NotFound {
                resource: "avatar",
                identifier: "id",
            })
    }

    async fn list_avatars(&self) -> Result<Vec<AvatarData>> {
        Ok(self.state.read().avatars.values().cloned().collect())
    }

    async fn create_avatar(&self, new_avatar: NewAvatar) -> Result<AvatarData> {
        let mut state = self.state.write();

        let id = state.allocate_id();
        let avatar = AvatarData {
            id,
            storage_id: new_avatar.storage_id,
            name: new_avatar.name,
            created_at: Utc::now(),
        };

        state.avatars.insert(id, avatar.clone());
        Ok(avatar)
    }

    async fn update_avatar_name(&self, avatar_id: PrimaryKey, name: String) -> Result<AvatarData> {
        let mut state = self.state.write();
        let avatar = state
            .avatars
            .get_mut(&avatar_id)
            .ok_or(DatabaseError::NotFound {
                resource: "avatar",
                identifier: "id",
            })?;

        avatar.name = name;
        Ok(avatar.clone())
    }

    async fn delete_avatar(&self, avatar_id: PrimaryKey) -> Result<()> {
        let mut state = self.state.write();

        state
            .avatars
            .remove(&avatar_id)
            .ok_or(DatabaseError::NotFound {
                resource: "avatar",
                identifier: "id",
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "not a real hash".to_string(),
            is_admin: false,
            avatar_color: "#f59e0b".to_string(),
            avatar_image: None,
            years_attended: vec![],
            questionnaire: None,
            onboarding_complete: true,
        }
    }

    #[tokio::test]
    async fn duplicate_usernames_conflict() {
        let db = MemoryDatabase::new();

        db.create_user(plain_user("alice")).await.unwrap();
        let err = db.create_user(plain_user("alice")).await.unwrap_err();

        assert!(matches!(err, DatabaseError::Conflict { .. }));
        assert_eq!(db.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn ranking_upsert_keeps_a_single_row() {
        let db = MemoryDatabase::new();
        let user = db.create_user(plain_user("alice")).await.unwrap();
        let artist = db
            .create_artist(NewArtist {
                name: "Phish".to_string(),
                year: 2025,
            })
            .await
            .unwrap();

        db.upsert_ranking(user.id, artist.id, 4, Utc::now())
            .await
            .unwrap();
        db.upsert_ranking(user.id, artist.id, 7, Utc::now())
            .await
            .unwrap();

        let rankings = db.rankings_by_user(user.id).await.unwrap();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].score, 7);
    }

    #[tokio::test]
    async fn group_order_follows_insertion_within_year() {
        let db = MemoryDatabase::new();

        for name in ["BALI 1", "BALI 2", "BALI 3"] {
            db.create_group(NewGroup {
                name: name.to_string(),
                year: 2025,
                artist_ids: vec![],
                status: None,
            })
            .await
            .unwrap();
        }

        db.create_group(NewGroup {
            name: "other year".to_string(),
            year: 2024,
            artist_ids: vec![],
            status: None,
        })
        .await
        .unwrap();

        let groups = db.groups_by_year(2025).await.unwrap();
        let orders: Vec<i32> = groups.iter().map(|g| g.order).collect();

        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(db.groups_by_year(2024).await.unwrap()[0].order, 0);
    }

    #[tokio::test]
    async fn artist_years_are_distinct_and_recent_first() {
        let db = MemoryDatabase::new();

        for (name, year) in [("A", 2023), ("B", 2025), ("C", 2023), ("D", 2024)] {
            db.create_artist(NewArtist {
                name: name.to_string(),
                year,
            })
            .await
            .unwrap();
        }

        assert_eq!(db.artist_years().await.unwrap(), vec![2025, 2024, 2023]);
    }
}
