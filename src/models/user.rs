use std::sync::Arc;

use crate::constants::{USER_BIO_FRAGMENT, USER_BIO_REPEAT};

/// Light row for the `users` table
///
/// `id` and `created_at` are assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub username: String,
    pub bio: Arc<str>,
}

impl UserRow {
    pub const INSERT_SQL: &'static str = "INSERT INTO users (username, bio) VALUES ($1, $2)";

    /// Fixed bio text shared by every user row (~230 bytes)
    pub fn bio() -> Arc<str> {
        Arc::from(USER_BIO_FRAGMENT.repeat(USER_BIO_REPEAT))
    }

    /// Build a row from a drawn username suffix
    pub fn from_draw(bio: &Arc<str>, suffix: u32) -> Self {
        Self {
            username: format!("user_{suffix}"),
            bio: Arc::clone(bio),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_format() {
        let bio = UserRow::bio();
        let row = UserRow::from_draw(&bio, 123_456);
        assert_eq!(row.username, "user_123456");
    }

    #[test]
    fn test_bio_is_shared() {
        let bio = UserRow::bio();
        let a = UserRow::from_draw(&bio, 1);
        let b = UserRow::from_draw(&bio, 2);

        assert!(Arc::ptr_eq(&a.bio, &b.bio));
        assert_eq!(bio.len(), 220);
    }
}
