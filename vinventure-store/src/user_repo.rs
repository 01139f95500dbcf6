use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;
use vinventure_core::identity::IdentityProvider;
use vinventure_core::user::{NewUser, ProfileUpdate, User, UserRepository, UserRole};
use vinventure_core::{CoreError, CoreResult};
use vinventure_shared::pii::Masked;

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    identity_provider: String,
    external_subject: String,
    email: Option<String>,
    name: Option<String>,
    phone: Option<String>,
    role: String,
    preferences: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = CoreError;

    fn try_from(row: UserRow) -> Result<Self, CoreError> {
        let provider = IdentityProvider::parse(&row.identity_provider).ok_or_else(|| {
            CoreError::InternalError(format!("Corrupt identity provider: {}", row.identity_provider))
        })?;
        let role = UserRole::parse(&row.role)
            .ok_or_else(|| CoreError::InternalError(format!("Corrupt user role: {}", row.role)))?;
        Ok(User {
            id: row.id,
            provider,
            external_subject: row.external_subject,
            email: row.email.map(Masked),
            name: row.name,
            phone: row.phone,
            role,
            preferences: row.preferences,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn internal(e: sqlx::Error) -> CoreError {
    tracing::error!("User store failure: {}", e);
    CoreError::InternalError(e.to_string())
}

const USER_COLUMNS: &str = "id, identity_provider, external_subject, email, name, phone, role, preferences, created_at, updated_at";

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_or_create(&self, new_user: NewUser) -> CoreResult<User> {
        // The no-op DO UPDATE makes RETURNING yield the existing row, so concurrent
        // first requests from the same identity both resolve to one account.
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (id, identity_provider, external_subject, email, name, role)
            VALUES ($1, $2, $3, $4, $5, 'GUEST')
            ON CONFLICT (identity_provider, external_subject)
            DO UPDATE SET updated_at = NOW()
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(new_user.provider.as_str())
        .bind(new_user.external_subject)
        .bind(new_user.email)
        .bind(new_user.name)
        .fetch_one(&self.pool)
        .await
        .map_err(internal)?;

        row.try_into()
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        row.map(User::try_from).transpose()
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                preferences = COALESCE($4, preferences),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(id)
        .bind(update.name)
        .bind(update.phone)
        .bind(update.preferences)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or_else(|| CoreError::NotFoundError("User not found".to_string()))?;

        row.try_into()
    }
}
