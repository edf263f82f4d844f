use std::sync::Arc;

use crate::auth::{
    repo::{TokenRepository, UserRepository},
    AuthService,
};
use crate::config::AppConfig;
use crate::db::PgStore;
use crate::expenses::{repo::ExpenseRepository, ExpenseService};
use crate::memory::MemoryStore;
use crate::notifications::{Address, LogMailer, Mailer, Notifier};

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub expenses: ExpenseService,
}

impl AppState {
    /// Connects to Postgres, applies migrations and starts the mail worker.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let store = PgStore::connect(&config).await?;
        store.migrate().await?;
        Ok(Self::from_store(config, Arc::new(store), Arc::new(LogMailer)))
    }

    /// State over an empty in-process store.
    pub fn in_memory(config: AppConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self::from_store(config, Arc::new(MemoryStore::new()), mailer)
    }

    pub fn from_store<S>(config: AppConfig, store: Arc<S>, mailer: Arc<dyn Mailer>) -> Self
    where
        S: UserRepository + TokenRepository + ExpenseRepository + 'static,
    {
        let users: Arc<dyn UserRepository> = store.clone();
        let tokens: Arc<dyn TokenRepository> = store.clone();
        let expenses: Arc<dyn ExpenseRepository> = store;

        let notifier = Notifier::spawn(mailer);
        let auth = AuthService::new(users.clone(), tokens);
        let expenses = ExpenseService::new(
            expenses,
            users,
            notifier,
            Address::from(&config.mail),
            &config.app_url,
        );

        Self { auth, expenses }
    }
}
