use crate::auth::{jwt::JwtKeys, password};
use crate::config::AppConfig;
use crate::users::{
    memory::MemoryUserStore,
    repo::{PgUserStore, UserStore},
};
use anyhow::Context;
use std::sync::Arc;

/// `DATABASE_URL` value that selects the in-process store.
pub const MEMORY_DATABASE_URL: &str = "memory://";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: Arc<JwtKeys>,
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        // Build the dummy hash now so the first unknown-email login is not slower.
        tokio::task::spawn_blocking(password::warm_up)
            .await
            .context("warm up password hasher")?;

        let users = if config.database_url == MEMORY_DATABASE_URL {
            tracing::warn!("using in-memory user store; accounts vanish on restart");
            Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
        } else {
            let db = sqlx::postgres::PgPoolOptions::new()
                .max_connections(10)
                .connect(&config.database_url)
                .await
                .context("connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&db)
                .await
                .context("run migrations")?;

            Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
        };

        Ok(Self::from_parts(config, users))
    }

    pub fn from_parts(config: Arc<AppConfig>, users: Arc<dyn UserStore>) -> Self {
        let keys = Arc::new(JwtKeys::new(&config.jwt));
        Self {
            config,
            keys,
            users,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryUserStore::new()))
    }

    #[cfg(test)]
    pub fn fake_with(users: Arc<dyn UserStore>) -> Self {
        let config = Arc::new(AppConfig {
            database_url: MEMORY_DATABASE_URL.into(),
            host: "127.0.0.1".into(),
            port: 0,
            jwt: crate::config::JwtConfig {
                secret: "test".into(),
                algorithm: jsonwebtoken::Algorithm::HS256,
                ttl_minutes: 5,
            },
        });
        Self::from_parts(config, users)
    }
}
