use std::{
    collections::{HashMap, HashSet},
    path::Path,
    sync::Arc,
};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    error::AppError,
    models::{
        trip::Trip,
        user::{User, UserId},
    },
};

/// Source of truth for which trips a user owns.
pub trait TripRepository {
    fn find_trips_by_user(&self, user: &User) -> Result<Vec<Trip>, AppError>;
}

impl<T: TripRepository + ?Sized> TripRepository for &T {
    fn find_trips_by_user(&self, user: &User) -> Result<Vec<Trip>, AppError> {
        (**self).find_trips_by_user(user)
    }
}

impl<T: TripRepository + ?Sized> TripRepository for Arc<T> {
    fn find_trips_by_user(&self, user: &User) -> Result<Vec<Trip>, AppError> {
        (**self).find_trips_by_user(user)
    }
}

#[derive(Clone, Default)]
pub struct TripStore {
    trips: Arc<RwLock<Vec<Trip>>>,
}

impl TripStore {
    pub fn new(trips: Vec<Trip>) -> Self {
        Self {
            trips: Arc::new(RwLock::new(trips)),
        }
    }

    pub fn add_trip(&self, trip: Trip) {
        self.trips.write().push(trip);
    }

    pub fn len(&self) -> usize {
        self.trips.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TripRepository for TripStore {
    fn find_trips_by_user(&self, user: &User) -> Result<Vec<Trip>, AppError> {
        Ok(self
            .trips
            .read()
            .iter()
            .filter(|trip| &trip.owner == user.id())
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub struct UserDirectory {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl UserDirectory {
    pub fn insert(&self, user: User) -> Option<User> {
        self.users.write().insert(user.id().clone(), user)
    }

    pub fn get(&self, id: &UserId) -> Option<User> {
        self.users.read().get(id).cloned()
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.users
            .read()
            .values()
            .find(|user| user.username() == username)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Seed snapshot of users and trips.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub trips: Vec<Trip>,
}

impl Dataset {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path)?;
        let dataset = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            users = dataset.users.len(),
            trips = dataset.trips.len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let dataset: Dataset = serde_json::from_str(raw)?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// User ids and usernames must be unique, and every friend and trip
    /// owner must be a user of this dataset.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut known = HashSet::new();
        let mut usernames = HashSet::new();
        for user in &self.users {
            if !known.insert(user.id()) {
                return Err(AppError::Config(format!("duplicate user id {}", user.id())));
            }
            if !usernames.insert(user.username()) {
                return Err(AppError::Config(format!(
                    "duplicate username {}",
                    user.username()
                )));
            }
        }
        for user in &self.users {
            if let Some(stranger) = user.friends().find(|friend| !known.contains(friend)) {
                return Err(AppError::Config(format!(
                    "user {} lists unknown friend {}",
                    user.id(),
                    stranger
                )));
            }
        }
        if let Some(orphan) = self.trips.iter().find(|trip| !known.contains(&trip.owner)) {
            return Err(AppError::Config(format!(
                "trip {} belongs to unknown user {}",
                orphan.id, orphan.owner
            )));
        }
        Ok(())
    }

    pub fn into_stores(self) -> (UserDirectory, TripStore) {
        let users = UserDirectory::default();
        for user in self.users {
            users.insert(user);
        }
        (users, TripStore::new(self.trips))
    }
}
