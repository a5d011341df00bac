use tracing::debug;

use crate::{
    auth::SessionProvider,
    error::AppError,
    models::{trip::Trip, user::User},
    services::storage::TripRepository,
};

/// Hands out a user's trips to their friends, and only while someone is
/// logged in.
pub struct TripService<S, R> {
    sessions: S,
    trips: R,
}

impl<S, R> TripService<S, R>
where
    S: SessionProvider,
    R: TripRepository,
{
    pub fn new(sessions: S, trips: R) -> Self {
        Self { sessions, trips }
    }

    /// Trips of `target` visible to the logged-in user.
    ///
    /// Fails with [`AppError::NotAuthenticated`] when nobody is logged in,
    /// whatever `target` is. A logged-in user who is not in `target`'s
    /// friend set gets an empty list. Being `target` does not count as
    /// being a friend.
    pub fn get_trips_for_user(&self, target: Option<&User>) -> Result<Vec<Trip>, AppError> {
        let logged_in = self
            .sessions
            .logged_in_user()?
            .ok_or(AppError::NotAuthenticated)?;

        let Some(target) = target.filter(|target| target.has_friend(&logged_in)) else {
            debug!(user = %logged_in.id(), "no visible trips");
            return Ok(Vec::new());
        };

        let trips = self.trips.find_trips_by_user(target)?;
        debug!(
            user = %logged_in.id(),
            target = %target.id(),
            count = trips.len(),
            "trips visible to friend"
        );
        Ok(trips)
    }
}
