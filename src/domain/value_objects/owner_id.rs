use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved owner for records created before sign-in.
pub const GUEST_OWNER_ID: &str = "guest";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Result<Self, String> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err("Owner id cannot be empty".to_string());
        }
        Ok(Self(value))
    }

    pub fn guest() -> Self {
        Self(GUEST_OWNER_ID.to_string())
    }

    /// Parses an authenticated user id, refusing the guest sentinel.
    pub fn user(value: impl Into<String>) -> Result<Self, String> {
        let owner = Self::new(value)?;
        if owner.is_guest() {
            return Err(format!("'{GUEST_OWNER_ID}' is reserved for guest data"));
        }
        Ok(owner)
    }

    pub fn is_guest(&self) -> bool {
        self.0 == GUEST_OWNER_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
