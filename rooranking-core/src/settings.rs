use std::sync::Arc;

use chrono::{Datelike, Utc};
use serde_json::json;

use crate::{Database, DatabaseError};

/// The singleton key-value settings collection. The only key in use is the
/// globally selected festival year.
pub struct Settings {
    db: Arc<dyn Database>,
}

const ACTIVE_YEAR_KEY: &str = "activeYear";

impl Settings {
    pub fn new(db: &Arc<dyn Database>) -> Self {
        Self { db: db.clone() }
    }

    /// The festival year shown by default, falling back to the current
    /// calendar year when none was ever set
    pub async fn active_year(&self) -> Result<i32, DatabaseError> {
        match self.db.setting_by_key(ACTIVE_YEAR_KEY).await {
            Ok(setting) => Ok(setting
                .value
                .as_i64()
                .map(|year| year as i32)
                .unwrap_or_else(current_year)),
            Err(e) if e.is_not_found() => Ok(current_year()),
            Err(e) => Err(e),
        }
    }

    pub async fn set_active_year(&self, year: i32) -> Result<(), DatabaseError> {
        self.db
            .upsert_setting(ACTIVE_YEAR_KEY, json!(year))
            .await
            .map(|_| ())
    }

    /// Writes the default active year, unless one was already chosen
    pub async fn ensure_active_year(&self, year: i32) -> Result<(), DatabaseError> {
        match self.db.setting_by_key(ACTIVE_YEAR_KEY).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_not_found() => self.set_active_year(year).await,
            Err(e) => Err(e),
        }
    }
}

fn current_year() -> i32 {
    Utc::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryDatabase;

    fn setup() -> Settings {
        let db: Arc<dyn Database> = Arc::new(MemoryDatabase::new());
        Settings::new(&db)
    }

    #[tokio::test]
    async fn defaults_to_the_current_calendar_year() {
        let settings = setup();
        assert_eq!(settings.active_year().await.unwrap(), Utc::now().year());
    }

    #[tokio::test]
    async fn set_active_year_round_trips() {
        let settings = setup();

        settings.set_active_year(2025).await.unwrap();
        assert_eq!(settings.active_year().await.unwrap(), 2025);

        settings.set_active_year(2026).await.unwrap();
        assert_eq!(settings.active_year().await.unwrap(), 2026);
    }

    #[tokio::test]
    async fn ensure_active_year_never_overwrites() {
        let settings = setup();

        settings.ensure_active_year(2025).await.unwrap();
        settings.ensure_active_year(2019).await.unwrap();

        assert_eq!(settings.active_year().await.unwrap(), 2025);
    }
}
