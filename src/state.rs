use tracing::info;

use crate::{
    auth::{RequestSession, SessionStore},
    config::AppConfig,
    error::AppError,
    services::{
        storage::{Dataset, TripStore, UserDirectory},
        trip::TripService,
    },
    telemetry,
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub users: UserDirectory,
    pub sessions: SessionStore,
    pub trips: TripStore,
}

impl AppState {
    /// Loads config from `.env` and the environment, installs logging with
    /// the configured filter and builds the state.
    pub fn bootstrap() -> Result<Self, AppError> {
        let config = AppConfig::load()?;
        telemetry::init_logging(&config.log_filter);
        Self::new(config)
    }

    /// Builds the state, seeding it from `config.data_file` when one is set.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let dataset = match config.data_file.as_deref() {
            Some(path) => Dataset::load(path)?,
            None => Dataset::default(),
        };
        Ok(Self::from_dataset(config, dataset))
    }

    pub fn from_dataset(config: AppConfig, dataset: Dataset) -> Self {
        let (users, trips) = dataset.into_stores();
        let sessions = SessionStore::new(config.session_ttl);
        info!(users = users.len(), trips = trips.len(), "state ready");
        Self {
            config,
            users,
            sessions,
            trips,
        }
    }

    /// Opens a session for a known user and returns its token. Seeded
    /// datasets guarantee usernames are unique.
    pub fn login(&self, username: &str) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .ok_or(AppError::NotFound)?;
        let token = self.sessions.create_session(user.id());
        info!(user = %user.id(), "logged in");
        Ok(token)
    }

    pub fn logout(&self, token: &str) {
        if self.sessions.destroy_session(token) {
            info!("logged out");
        }
    }

    pub fn request_session(&self, token: Option<&str>) -> RequestSession {
        RequestSession::new(
            token.map(str::to_string),
            self.sessions.clone(),
            self.users.clone(),
        )
    }

    pub fn trip_service(&self, token: Option<&str>) -> TripService<RequestSession, TripStore> {
        TripService::new(self.request_session(token), self.trips.clone())
    }
}
