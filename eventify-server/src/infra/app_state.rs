use std::{fmt, sync::Arc};

use eventify_core::{AuthCrypto, DatabaseContext, SuperUserService};

use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub database: DatabaseContext,
    pub superusers: Arc<SuperUserService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.database.backend())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wire the service layer over the repositories of `database`.
    pub fn new(
        config: Arc<Config>,
        database: DatabaseContext,
        auth_crypto: Arc<AuthCrypto>,
    ) -> Self {
        let superusers = Arc::new(SuperUserService::new(
            database.superusers(),
            auth_crypto,
        ));

        Self {
            config,
            database,
            superusers,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn superusers(&self) -> &SuperUserService {
        &self.superusers
    }
}
