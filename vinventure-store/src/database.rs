use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres, Row};
use std::time::Duration;
use tracing::info;

use crate::app_config::BusinessRules;

#[derive(Clone)]
pub struct DbClient {
    pub pool: Pool<Postgres>,
}

impl DbClient {
    pub async fn new(connection_string: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(connection_string)
            .await?;

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("../migrations").run(&self.pool).await?;
        info!("Migrations completed successfully.");
        Ok(())
    }

    /// Operational overrides for the file-based defaults. Rows are keyed by rule name
    /// and hold `{"value": <number>}` payloads.
    pub async fn fetch_business_rules(
        &self,
        defaults: BusinessRules,
    ) -> Result<BusinessRules, sqlx::Error> {
        let rows = sqlx::query("SELECT rule_key, rule_value FROM business_rules")
            .fetch_all(&self.pool)
            .await?;

        let mut rules = defaults;

        for row in rows {
            let rule_key: String = row.try_get("rule_key")?;
            let rule_value: serde_json::Value = row.try_get("rule_value")?;

            if let Some(v) = rule_value.get("value") {
                match rule_key.as_str() {
                    "default_page_limit" => {
                        if let Some(u) = v.as_u64() {
                            rules.default_page_limit = u as u32;
                        }
                    }
                    "max_page_limit" => {
                        if let Some(u) = v.as_u64() {
                            rules.max_page_limit = u as u32;
                        }
                    }
                    "admission_timeout_ms" => {
                        if let Some(u) = v.as_u64() {
                            rules.admission_timeout_ms = u;
                        }
                    }
                    "rate_limit_per_minute" => {
                        if let Some(i) = v.as_i64() {
                            rules.rate_limit_per_minute = i;
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(rules)
    }
}
