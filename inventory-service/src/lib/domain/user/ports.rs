use async_trait::async_trait;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing username, email, and password
    ///
    /// # Returns
    /// Persisted user entity, including its assigned identifier
    ///
    /// # Errors
    /// * `DuplicateUser` - Username or email is already registered
    /// * `Password` - Password is too long or could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn register_user(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Check a username/password pair.
    ///
    /// # Returns
    /// `Some(user)` only when the user exists and the password matches.
    /// Unknown users and wrong passwords both yield `None`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn authenticate_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, UserError>;
}

/// Persistence operations for user aggregate (the user directory).
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// Implementations must enforce username and email uniqueness themselves;
    /// the service-level pre-checks do not hold under concurrent writes.
    ///
    /// # Errors
    /// * `DuplicateUser` - Username or email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;
}
