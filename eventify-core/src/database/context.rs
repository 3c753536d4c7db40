use std::fmt;
use std::sync::Arc;

#[cfg(feature = "postgres")]
use sqlx::PgPool;
#[cfg(feature = "surreal")]
use surrealdb::{Connection, Surreal};

use crate::database::infrastructure::memory::{
    InMemoryEventRepository, InMemorySuperUserRepository,
};
#[cfg(feature = "postgres")]
use crate::database::infrastructure::postgres::{
    self, PostgresEventRepository, PostgresPoolSettings, PostgresSuperUserRepository,
};
#[cfg(feature = "surreal")]
use crate::database::infrastructure::surreal::{
    self, SurrealEventRepository, SurrealSettings, SurrealSuperUserRepository,
};
use crate::database::ports::{events::EventRepository, superusers::SuperUserRepository};
use crate::error::Result;

/// Storage technology selected at startup.
#[derive(Debug, Clone, Default)]
pub enum DatabaseBackend {
    #[default]
    Memory,
    #[cfg(feature = "postgres")]
    Postgres {
        url: String,
        pool: PostgresPoolSettings,
    },
    #[cfg(feature = "surreal")]
    Surreal(SurrealSettings),
}

impl DatabaseBackend {
    pub fn name(&self) -> &'static str {
        match self {
            DatabaseBackend::Memory => "memory",
            #[cfg(feature = "postgres")]
            DatabaseBackend::Postgres { .. } => "postgres",
            #[cfg(feature = "surreal")]
            DatabaseBackend::Surreal(_) => "surreal",
        }
    }
}

/// Bundles the repositories of one backend behind their ports.
///
/// Callers never see the concrete backend; swapping storage is a matter of
/// building a different context.
#[derive(Clone)]
pub struct DatabaseContext {
    backend: &'static str,
    superusers: Arc<dyn SuperUserRepository>,
    events: Arc<dyn EventRepository>,
}

impl fmt::Debug for DatabaseContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseContext")
            .field("backend", &self.backend)
            .field("superusers_ptr", &Arc::as_ptr(&self.superusers))
            .field("events_ptr", &Arc::as_ptr(&self.events))
            .finish()
    }
}

impl DatabaseContext {
    /// Open the selected backend and compose its repositories.
    pub async fn connect(backend: &DatabaseBackend) -> Result<Self> {
        match backend {
            DatabaseBackend::Memory => Ok(Self::in_memory()),
            #[cfg(feature = "postgres")]
            DatabaseBackend::Postgres { url, pool } => {
                let pool = postgres::connect(url, pool).await?;
                Ok(Self::from_pg_pool(pool))
            }
            #[cfg(feature = "surreal")]
            DatabaseBackend::Surreal(settings) => {
                let db = surreal::connect(settings).await?;
                Ok(Self::from_surreal(db))
            }
        }
    }

    pub fn in_memory() -> Self {
        Self::from_parts(
            "memory",
            Arc::new(InMemorySuperUserRepository::new()),
            Arc::new(InMemoryEventRepository::new()),
        )
    }

    /// Compose a context from an already migrated pool.
    #[cfg(feature = "postgres")]
    pub fn from_pg_pool(pool: PgPool) -> Self {
        Self::from_parts(
            "postgres",
            Arc::new(PostgresSuperUserRepository::new(pool.clone())),
            Arc::new(PostgresEventRepository::new(pool)),
        )
    }

    /// Compose a context from a client whose namespace, database and schema
    /// are already set up.
    #[cfg(feature = "surreal")]
    pub fn from_surreal<C: Connection>(db: Surreal<C>) -> Self {
        Self::from_parts(
            "surreal",
            Arc::new(SurrealSuperUserRepository::new(db.clone())),
            Arc::new(SurrealEventRepository::new(db)),
        )
    }

    pub fn from_parts(
        backend: &'static str,
        superusers: Arc<dyn SuperUserRepository>,
        events: Arc<dyn EventRepository>,
    ) -> Self {
        Self {
            backend,
            superusers,
            events,
        }
    }

    pub fn backend(&self) -> &'static str {
        self.backend
    }

    pub fn superusers(&self) -> Arc<dyn SuperUserRepository> {
        Arc::clone(&self.superusers)
    }

    pub fn events(&self) -> Arc<dyn EventRepository> {
        Arc::clone(&self.events)
    }
}
