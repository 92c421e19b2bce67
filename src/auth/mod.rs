//! Accounts: signup, credential checks and the session key that carries the
//! logged-in user.
//!
//! Password hashing is CPU-bound. [`new_user`] and [`verify_login`] never
//! touch the store, so async callers can run them off the store lock.

mod password;
mod session;

pub use password::{hash_password, verify_password};
pub use session::SESSION_USER_ID_KEY;

use crate::entity::User;
use crate::error::{NotekeeperError, Result};
use crate::forms::{FormErrors, LoginForm, SignupForm, NON_FIELD_ERRORS};
use crate::storage::SqliteStore;

/// Verified in place of a real hash when the username is unknown, so both
/// failures cost one argon2 run.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$bm90ZWtlZXBlcmR1bW15IQ$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Create an account from a signup submission.
pub fn signup(store: &SqliteStore, form: &SignupForm) -> Result<User> {
    form.validate().map_err(NotekeeperError::Validation)?;
    let user = new_user(form.username.trim(), &form.password1)?;
    save_signup(store, user)
}

/// Hash `password` and store a new user.
pub fn create_user(store: &SqliteStore, username: &str, password: &str) -> Result<User> {
    let user = new_user(username, password)?;
    save_user(store, &user)?;
    Ok(user)
}

/// Build an unsaved user with a freshly hashed password.
pub fn new_user(username: &str, password: &str) -> Result<User> {
    Ok(User::new(username.to_string(), hash_password(password)?))
}

/// Store a user built from a signup; a taken username becomes a field error.
pub fn save_signup(store: &SqliteStore, user: User) -> Result<User> {
    save_user(store, &user).map_err(|e| match e {
        NotekeeperError::UsernameTaken => {
            let mut errors = FormErrors::new();
            errors.add("username", e.to_string());
            NotekeeperError::Validation(errors)
        }
        other => other,
    })?;
    Ok(user)
}

fn save_user(store: &SqliteStore, user: &User) -> Result<()> {
    store.create_user(user)?;
    tracing::info!(username = %user.username, "user created");
    Ok(())
}

/// Check a login submission against stored credentials.
pub fn authenticate(store: &SqliteStore, form: &LoginForm) -> Result<User> {
    form.validate().map_err(NotekeeperError::Validation)?;
    let user = store.get_user_by_username(form.username.trim())?;
    verify_login(user, &form.password)
}

/// Check `password` against `user`, if one was found. A missing user and a
/// wrong password yield the same error after the same amount of work.
pub fn verify_login(user: Option<User>, password: &str) -> Result<User> {
    let hash = user
        .as_ref()
        .map_or(DUMMY_HASH, |u| u.password_hash.as_str());
    let matches = verify_password(password, hash)?;

    match user {
        Some(user) if matches => Ok(user),
        _ => {
            let mut errors = FormErrors::new();
            errors.add(NON_FIELD_ERRORS, NotekeeperError::InvalidCredentials.to_string());
            Err(NotekeeperError::Validation(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_form(username: &str, password: &str) -> SignupForm {
        SignupForm {
            username: username.into(),
            password1: password.into(),
            password2: password.into(),
        }
    }

    #[test]
    fn test_signup_then_authenticate() {
        let store = SqliteStore::open_in_memory().unwrap();
        let user = signup(&store, &signup_form("author", "s3cret-pass")).unwrap();

        let login = LoginForm {
            username: "author".into(),
            password: "s3cret-pass".into(),
        };
        assert_eq!(authenticate(&store, &login).unwrap().id, user.id);
    }

    #[test]
    fn test_signup_duplicate_username() {
        let store = SqliteStore::open_in_memory().unwrap();
        signup(&store, &signup_form("author", "s3cret-pass")).unwrap();

        match signup(&store, &signup_form("author", "another-pass")) {
            Err(NotekeeperError::Validation(errors)) => {
                assert_eq!(errors.get("username").len(), 1)
            }
            other => panic!("Expected Validation, got {:?}", other.map(|u| u.username)),
        }
    }

    #[test]
    fn test_wrong_password_and_unknown_user_look_alike() {
        let store = SqliteStore::open_in_memory().unwrap();
        signup(&store, &signup_form("author", "s3cret-pass")).unwrap();

        let wrong = authenticate(
            &store,
            &LoginForm {
                username: "author".into(),
                password: "nope-nope".into(),
            },
        );
        let unknown = authenticate(
            &store,
            &LoginForm {
                username: "ghost".into(),
                password: "nope-nope".into(),
            },
        );
        match (wrong, unknown) {
            (Err(NotekeeperError::Validation(a)), Err(NotekeeperError::Validation(b))) => {
                assert_eq!(a, b);
                assert_eq!(a.get(NON_FIELD_ERRORS).len(), 1);
            }
            _ => panic!("Expected both logins to fail validation"),
        }
    }

    #[test]
    fn test_unknown_user_checked_against_dummy_hash() {
        match verify_login(None, "whatever-pass") {
            Err(NotekeeperError::Validation(errors)) => {
                assert_eq!(errors.get(NON_FIELD_ERRORS).len(), 1)
            }
            other => panic!("Expected Validation, got {:?}", other.map(|u| u.username)),
        }
    }

    #[test]
    fn test_verify_login_without_store() {
        let user = new_user("author", "s3cret-pass").unwrap();
        let id = user.id;
        assert_eq!(verify_login(Some(user.clone()), "s3cret-pass").unwrap().id, id);
        assert!(verify_login(Some(user), "wrong-pass").is_err());
    }

    #[test]
    fn test_save_signup_taken_username() {
        let store = SqliteStore::open_in_memory().unwrap();
        save_signup(&store, new_user("author", "s3cret-pass").unwrap()).unwrap();

        let err = save_signup(&store, new_user("author", "other-pass").unwrap()).unwrap_err();
        assert!(matches!(err, NotekeeperError::Validation(ref e) if e.get("username").len() == 1));
    }
}
