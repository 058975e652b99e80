use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::email_local_part;

/// Display metadata for an account. `id` is the account id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The profile created on first access, named after the email's local part.
    pub fn default_for(user_id: Uuid, email: &str) -> Self {
        let now = Utc::now();
        Self {
            id: user_id,
            name: email_local_part(email).to_string(),
            display_name: None,
            avatar_url: None,
            website: None,
            bio: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Editable profile fields. `None` clears the optional columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub name: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub website: Option<String>,
    pub bio: Option<String>,
}

impl ProfileChanges {
    pub fn apply_to(self, profile: &mut Profile) {
        profile.name = self.name;
        profile.display_name = blank_to_none(self.display_name);
        profile.avatar_url = blank_to_none(self.avatar_url);
        profile.website = blank_to_none(self.website);
        profile.bio = blank_to_none(self.bio);
        profile.updated_at = Utc::now();
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_uses_local_part() {
        let profile = Profile::default_for(Uuid::new_v4(), "writer@example.com");
        assert_eq!(profile.name, "writer");
        assert!(profile.bio.is_none());
    }

    #[test]
    fn test_blank_optional_fields_are_cleared() {
        let mut profile = Profile::default_for(Uuid::new_v4(), "writer@example.com");
        ProfileChanges {
            name: "Writer".to_string(),
            website: Some("  ".to_string()),
            bio: Some("Hello".to_string()),
            ..Default::default()
        }
        .apply_to(&mut profile);

        assert_eq!(profile.name, "Writer");
        assert_eq!(profile.website, None);
        assert_eq!(profile.bio.as_deref(), Some("Hello"));
    }
}
