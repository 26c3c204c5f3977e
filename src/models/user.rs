//! User record served by `GET /user/:id`.

use serde::{Deserialize, Serialize};

/// A user as held by the origin database.
///
/// Field order is the wire order: `{"id":"42","name":"User 42"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Opaque identifier, also the cache key
    pub id: String,
    /// Display name
    pub name: String,
}

impl UserRecord {
    /// Creates a new UserRecord
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_wire_shape() {
        let user = UserRecord::new("42", "User 42");
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"id":"42","name":"User 42"}"#);
    }

    #[test]
    fn test_user_record_rejects_missing_fields() {
        let result = serde_json::from_str::<UserRecord>(r#"{"id":"42"}"#);
        assert!(result.is_err());
    }
}
