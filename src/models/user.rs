use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user and the ids of the users it calls friends.
///
/// The friend set is fixed once the user is built. Friendship is not
/// symmetric: `a.has_friend(&b)` says nothing about `b.has_friend(&a)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    username: String,
    #[serde(default)]
    friends: BTreeSet<UserId>,
}

impl User {
    pub fn builder(username: impl Into<String>) -> UserBuilder {
        UserBuilder::new(username)
    }

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn friends(&self) -> impl Iterator<Item = &UserId> {
        self.friends.iter()
    }

    pub fn friend_count(&self) -> usize {
        self.friends.len()
    }

    /// Whether `other` is in this user's friend set.
    pub fn has_friend(&self, other: &User) -> bool {
        self.friends.contains(&other.id)
    }
}

#[derive(Debug, Clone)]
pub struct UserBuilder {
    id: Option<UserId>,
    username: String,
    friends: BTreeSet<UserId>,
}

impl UserBuilder {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            friends: BTreeSet::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<UserId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn friend_with<'a, I>(mut self, friends: I) -> Self
    where
        I: IntoIterator<Item = &'a User>,
    {
        self.friends
            .extend(friends.into_iter().map(|friend| friend.id.clone()));
        self
    }

    pub fn friend_ids<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = UserId>,
    {
        self.friends.extend(ids);
        self
    }

    pub fn build(self) -> User {
        User {
            id: self.id.unwrap_or_else(UserId::generate),
            username: self.username,
            friends: self.friends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friendship_is_one_directional() {
        let alice = User::builder("alice").build();
        let bob = User::builder("bob").friend_with([&alice]).build();

        assert!(bob.has_friend(&alice));
        assert!(!alice.has_friend(&bob));
    }

    #[test]
    fn duplicate_friends_collapse() {
        let alice = User::builder("alice").build();
        let bob = User::builder("bob")
            .friend_with([&alice, &alice])
            .friend_ids([alice.id().clone()])
            .build();

        assert_eq!(bob.friend_count(), 1);
    }

    #[test]
    fn friendship_follows_identity_not_username() {
        let alice = User::builder("alice").with_id("u-1").build();
        let impostor = User::builder("alice").with_id("u-2").build();
        let bob = User::builder("bob").friend_with([&alice]).build();

        assert!(bob.has_friend(&alice));
        assert!(!bob.has_friend(&impostor));
    }

    #[test]
    fn deserializes_without_friends() {
        let user: User = serde_json::from_str(r#"{"id":"u-1","username":"alice"}"#).unwrap();
        assert_eq!(user.id().as_str(), "u-1");
        assert_eq!(user.friend_count(), 0);
    }
}
