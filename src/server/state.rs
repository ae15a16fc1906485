use std::sync::Arc;

use anyhow::Result;

use crate::{
    auth::AuthService,
    config::Config,
    db::{self, Database},
};

pub struct AppState {
    pub config: Config,
    pub auth: AuthService,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let db = db::init(&config).await?;

        Ok(Self::with_database(config, db))
    }

    pub fn with_database(config: Config, db: Database) -> Arc<Self> {
        let auth = AuthService::new(db, config.bcrypt_cost);

        Arc::new(Self { config, auth })
    }
}
