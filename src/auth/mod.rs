//! Account management: registration, lookup, and credential verification.

pub mod session;

use rusqlite::{params, OptionalExtension};

use crate::db::models::User;
use crate::state::DbPool;

/// An authenticated account: provider-assigned uid plus the email used as
/// the human-facing authorship key.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("email already registered")]
    EmailExists,

    #[error("invalid email address")]
    InvalidEmail,

    #[error("no account found")]
    NotFound,

    #[error("invalid credentials")]
    BadCredentials,

    #[error("{0}")]
    Other(String),
}

pub trait IdentityGateway: Send + Sync {
    /// Register a new account. Returns the new uid.
    fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    fn get_by_email(&self, email: &str) -> Result<Identity, IdentityError>;

    fn get_by_uid(&self, uid: &str) -> Result<Identity, IdentityError>;

    /// Verify email + password. Unknown email and wrong password are
    /// distinguishable to the caller but must collapse into one user-facing
    /// message so account existence is not leaked.
    fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError>;
}

pub struct SqliteIdentityGateway {
    pool: DbPool,
}

impl SqliteIdentityGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn fetch_by_email(&self, email: &str) -> Result<Option<User>, IdentityError> {
        let conn = self
            .pool
            .get()
            .map_err(|e| IdentityError::Other(e.to_string()))?;
        conn.query_row(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?1",
            params![email],
            |row| {
                Ok(User {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    password_hash: row.get(2)?,
                    created_at: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| IdentityError::Other(e.to_string()))
    }
}

impl IdentityGateway for SqliteIdentityGateway {
    fn create_account(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        if !email_is_valid(email) {
            return Err(IdentityError::InvalidEmail);
        }
        if self.fetch_by_email(email)?.is_some() {
            return Err(IdentityError::EmailExists);
        }

        let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| IdentityError::Other(e.to_string()))?;
        let uid = uuid::Uuid::now_v7().to_string();

        let conn = self
            .pool
            .get()
            .map_err(|e| IdentityError::Other(e.to_string()))?;
        let inserted = conn.execute(
            "INSERT INTO users (id, email, password_hash) VALUES (?1, ?2, ?3)",
            params![uid, email, hash],
        );
        match inserted {
            Ok(_) => Ok(uid),
            // Two signups racing on the same email: the unique index wins
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(IdentityError::EmailExists)
            }
            Err(e) => Err(IdentityError::Other(e.to_string())),
        }
    }

    fn get_by_email(&self, email: &str) -> Result<Identity, IdentityError> {
        if !email_is_valid(email) {
            return Err(IdentityError::InvalidEmail);
        }
        match self.fetch_by_email(email)? {
            Some(user) => Ok(Identity {
                id: user.id,
                email: user.email,
            }),
            None => Err(IdentityError::NotFound),
        }
    }

    fn get_by_uid(&self, uid: &str) -> Result<Identity, IdentityError> {
        let conn = self
            .pool
            .get()
            .map_err(|e| IdentityError::Other(e.to_string()))?;
        conn.query_row(
            "SELECT id, email FROM users WHERE id = ?1",
            params![uid],
            |row| {
                Ok(Identity {
                    id: row.get(0)?,
                    email: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|e| IdentityError::Other(e.to_string()))?
        .ok_or(IdentityError::NotFound)
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        let user = self.fetch_by_email(email)?.ok_or(IdentityError::NotFound)?;
        let ok = bcrypt::verify(password, &user.password_hash)
            .map_err(|e| IdentityError::Other(e.to_string()))?;
        if !ok {
            return Err(IdentityError::BadCredentials);
        }
        Ok(Identity {
            id: user.id,
            email: user.email,
        })
    }
}

fn email_is_valid(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn gateway() -> SqliteIdentityGateway {
        SqliteIdentityGateway::new(test_pool())
    }

    #[test]
    fn email_shape_check() {
        assert!(email_is_valid("a@x.com"));
        assert!(email_is_valid("first.last@sub.example.org"));
        assert!(!email_is_valid(""));
        assert!(!email_is_valid("no-at-sign"));
        assert!(!email_is_valid("@x.com"));
        assert!(!email_is_valid("a@"));
        assert!(!email_is_valid("a@nodot"));
        assert!(!email_is_valid("a@.com"));
        assert!(!email_is_valid("a b@x.com"));
        assert!(!email_is_valid("a@b@x.com"));
    }

    #[test]
    fn create_then_authenticate() {
        let gateway = gateway();
        let uid = gateway.create_account("a@x.com", "hunter22").unwrap();

        let identity = gateway.authenticate("a@x.com", "hunter22").unwrap();
        assert_eq!(identity.id, uid);
        assert_eq!(identity.email, "a@x.com");
    }

    #[test]
    fn wrong_password_is_rejected() {
        let gateway = gateway();
        gateway.create_account("a@x.com", "hunter22").unwrap();

        let err = gateway.authenticate("a@x.com", "wrong").unwrap_err();
        assert!(matches!(err, IdentityError::BadCredentials));
    }

    #[test]
    fn unknown_email_is_not_found() {
        let gateway = gateway();
        let err = gateway.authenticate("ghost@x.com", "whatever").unwrap_err();
        assert!(matches!(err, IdentityError::NotFound));
    }

    #[test]
    fn duplicate_email_is_rejected_and_creates_no_second_account() {
        let gateway = gateway();
        gateway.create_account("a@x.com", "hunter22").unwrap();

        let err = gateway.create_account("a@x.com", "other-pass").unwrap_err();
        assert!(matches!(err, IdentityError::EmailExists));

        // Original credentials still work; the duplicate did not overwrite
        gateway.authenticate("a@x.com", "hunter22").unwrap();
    }

    #[test]
    fn malformed_email_is_rejected_before_hashing() {
        let gateway = gateway();
        let err = gateway.create_account("not-an-email", "hunter22").unwrap_err();
        assert!(matches!(err, IdentityError::InvalidEmail));
    }

    #[test]
    fn lookup_by_uid() {
        let gateway = gateway();
        let uid = gateway.create_account("a@x.com", "hunter22").unwrap();

        let identity = gateway.get_by_uid(&uid).unwrap();
        assert_eq!(identity.email, "a@x.com");

        let err = gateway.get_by_uid("missing").unwrap_err();
        assert!(matches!(err, IdentityError::NotFound));
    }

    #[test]
    fn lookup_by_email() {
        let gateway = gateway();
        gateway.create_account("a@x.com", "hunter22").unwrap();

        assert!(gateway.get_by_email("a@x.com").is_ok());
        assert!(matches!(
            gateway.get_by_email("b@x.com").unwrap_err(),
            IdentityError::NotFound
        ));
        assert!(matches!(
            gateway.get_by_email("bogus").unwrap_err(),
            IdentityError::InvalidEmail
        ));
    }

    #[test]
    fn passwords_are_stored_hashed() {
        let gateway = gateway();
        gateway.create_account("a@x.com", "hunter22").unwrap();

        let user = gateway.fetch_by_email("a@x.com").unwrap().unwrap();
        assert_ne!(user.password_hash, "hunter22");
        assert!(user.password_hash.starts_with("$2"));
    }
}
