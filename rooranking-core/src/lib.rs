mod auth;
mod avatars;
mod db;
mod lineup;
mod rankings;
mod settings;
mod storage;

use std::sync::Arc;

pub use auth::*;
pub use avatars::*;
pub use db::*;
pub use lineup::*;
pub use rankings::*;
pub use settings::*;
pub use storage::*;

/// The avatar color given to a seeded admin account
const DEFAULT_ADMIN_COLOR: &str = "#f59e0b";

/// The Roo Ranking system, facilitating lineups, groupings, rankings, and
/// authentication for a group of festival friends.
pub struct Festival {
    pub auth: Auth,
    pub lineup: Lineup,
    pub rankings: Rankings,
    pub settings: Settings,
    pub avatars: Avatars,
}

impl Festival {
    pub fn new(database: impl Database, storage: impl Storage) -> Self {
        let db: Arc<dyn Database> = Arc::new(database);
        let storage: Arc<dyn Storage> = Arc::new(storage);

        Self {
            auth: Auth::new(&db),
            lineup: Lineup::new(&db),
            rankings: Rankings::new(&db),
            settings: Settings::new(&db),
            avatars: Avatars::new(&db, &storage),
        }
    }

    /// First-run seeding: creates the admin account if none exists and picks
    /// the default active year if none was chosen. Returns whether the admin
    /// was created by this call.
    pub async fn seed(
        &self,
        admin_username: String,
        admin_password: String,
        default_year: i32,
    ) -> std::result::Result<bool, AuthError> {
        let created = match self
            .auth
            .register_admin(
                admin_username,
                admin_password,
                DEFAULT_ADMIN_COLOR.to_string(),
            )
            .await
        {
            Ok(_) => true,
            Err(AuthError::AdminExists) => false,
            Err(e) => return Err(e),
        };

        self.settings
            .ensure_active_year(default_year)
            .await
            .map_err(AuthError::Db)?;

        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;

    fn setup() -> Festival {
        Festival::new(MemoryDatabase::new(), MemoryStorage::default())
    }

    #[tokio::test]
    async fn register_login_rank_and_clear_end_to_end() {
        let festival = setup();

        festival
            .lineup
            .add_artists(&["Artist X".to_string()], 2025)
            .await
            .unwrap();
        let artist = festival.lineup.artists_by_year(2025).await.unwrap()[0].id;

        festival
            .auth
            .register(NewRegistration {
                username: "alice".to_string(),
                password: "secret1".to_string(),
                avatar_color: "#22c55e".to_string(),
                avatar_image: None,
                years_attended: vec![2025],
                questionnaire: None,
            })
            .await
            .unwrap();

        let session = festival
            .auth
            .login(Credentials {
                username: "alice".to_string(),
                password: "secret1".to_string(),
            })
            .await
            .unwrap();
        let user = session.user.id;

        festival.rankings.set_ranking(user, artist, 9).await.unwrap();

        let map = festival
            .rankings
            .user_rankings_for_year(user, 2025)
            .await
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&artist), Some(&9));

        festival.rankings.clear_ranking(user, artist).await.unwrap();

        let map = festival
            .rankings
            .user_rankings_for_year(user, 2025)
            .await
            .unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let festival = setup();

        let created = festival
            .seed("matt".to_string(), "bonnaroo".to_string(), 2025)
            .await
            .unwrap();
        assert!(created);

        let created = festival
            .seed("matt".to_string(), "bonnaroo".to_string(), 2019)
            .await
            .unwrap();
        assert!(!created);

        // The first seed's year sticks
        assert_eq!(festival.settings.active_year().await.unwrap(), 2025);

        let admins: Vec<_> = festival
            .auth
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.is_admin)
            .collect();
        assert_eq!(admins.len(), 1);
        assert_eq!(admins[0].username, "matt");
    }
}
