//! Users and the session's view of the signed-in user.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Sees and manages every task
    Admin,
    /// Sees tasks assigned to or created by them
    User,
}

impl UserRole {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }
}

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Login email (unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Role
    pub role: UserRole,

    /// Credential, only present in the backing user list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Avatar glyph
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,

    /// Department
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    /// Date the user joined
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<NaiveDate>,
}

impl User {
    /// Create a user with no optional profile fields.
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: UserId::new(id),
            email: email.into(),
            name: name.into(),
            role,
            password: None,
            avatar: None,
            department: None,
            join_date: None,
        }
    }

    /// Whether this user has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// The signed-in user as handed to the store: identity and display name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User id
    pub id: UserId,
    /// Display name at sign-in time
    pub name: String,
    /// Role
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user has the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// The session's list of known users.
///
/// Constructed once at startup and passed by reference; there is no global instance.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Build a directory from a user list.
    pub fn new(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Look a user up by id.
    pub fn get(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Look a user up by email.
    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|u| u.email == email)
    }

    /// Display name for a user id.
    pub fn name_of(&self, id: &UserId) -> Option<&str> {
        self.get(id).map(|u| u.name.as_str())
    }

    /// Session view of the user with this email, with the credential stripped.
    pub fn current_user(&self, email: &str) -> Option<CurrentUser> {
        self.find_by_email(email).map(CurrentUser::from)
    }

    /// All users, in registration order.
    pub fn all(&self) -> &[User] {
        &self.users
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> UserDirectory {
        let mut admin = User::new("1", "admin@example.com", "Admin User", UserRole::Admin);
        admin.password = Some("admin123".to_string());
        UserDirectory::new(vec![
            admin,
            User::new("2", "user@example.com", "John Doe", UserRole::User),
        ])
    }

    #[test]
    fn test_current_user_strips_credentials() {
        let dir = directory();
        let current = dir.current_user("admin@example.com").unwrap();
        assert_eq!(current.id, UserId::from("1"));
        assert_eq!(current.name, "Admin User");
        assert!(current.is_admin());

        let json = serde_json::to_value(&current).unwrap();
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_lookup() {
        let dir = directory();
        assert_eq!(dir.name_of(&UserId::from("2")), Some("John Doe"));
        assert!(dir.name_of(&UserId::from("9")).is_none());
        assert!(dir.current_user("nobody@example.com").is_none());
        assert_eq!(dir.all().len(), 2);
    }
}
