use chrono::Utc;

use crate::db::db::DBClient;
use crate::db::userdb::UserExt;
use crate::dtos::propertydtos::OwnerDetailsDto;
use crate::error::HttpError;
use crate::models::usermodel::User;
use crate::utils::{otp, password};

/// The owner fields a property write wants changed, reduced to the ones that
/// actually differ from what is stored. Applied as one batched update.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OwnerChangeSet {
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub whatsapp_number: Option<String>,
    pub agent_title: Option<String>,
    pub avatar: Option<String>,
}

fn candidate<'a>(incoming: Option<&'a str>, stored: Option<&str>) -> Option<&'a str> {
    incoming
        .filter(|value| !value.trim().is_empty())
        .filter(|value| stored != Some(*value))
}

impl OwnerChangeSet {
    /// Candidates are considered in a fixed order: full name, username, phone,
    /// whatsapp, agent title, then avatar. Email is left alone here; the
    /// create path uses it as the lookup key.
    pub fn diff(user: &User, incoming: &OwnerDetailsDto, avatar: Option<&str>) -> Self {
        OwnerChangeSet {
            full_name: candidate(incoming.full_name.as_deref(), Some(&user.full_name))
                .map(String::from),
            username: candidate(incoming.username.as_deref(), Some(&user.username))
                .map(String::from),
            email: None,
            phone_number: candidate(incoming.phone_number.as_deref(), user.phone_number.as_deref())
                .map(String::from),
            whatsapp_number: candidate(
                incoming.whatsapp_number.as_deref(),
                user.whatsapp_number.as_deref(),
            )
            .map(String::from),
            agent_title: candidate(incoming.agent_title.as_deref(), user.agent_title.as_deref())
                .map(String::from),
            avatar: candidate(avatar, user.avatar.as_deref()).map(String::from),
        }
    }

    /// Update-path variant: the owner row was found through the property, so
    /// the email itself is a legitimate candidate too.
    pub fn diff_for_update(user: &User, incoming: &OwnerDetailsDto, avatar: Option<&str>) -> Self {
        let mut changes = Self::diff(user, incoming, avatar);
        changes.email = candidate(incoming.email.as_deref(), Some(&user.email)).map(String::from);
        changes
    }

    pub fn changed(&self) -> bool {
        self.full_name.is_some()
            || self.username.is_some()
            || self.email.is_some()
            || self.phone_number.is_some()
            || self.whatsapp_number.is_some()
            || self.agent_title.is_some()
            || self.avatar.is_some()
    }
}

async fn apply_changes(
    db_client: &DBClient,
    user: User,
    changes: OwnerChangeSet,
) -> Result<User, HttpError> {
    if !changes.changed() {
        return Ok(user);
    }

    db_client
        .apply_owner_changes(
            user.id,
            changes.full_name.as_deref(),
            changes.username.as_deref(),
            changes.email.as_deref(),
            changes.phone_number.as_deref(),
            changes.whatsapp_number.as_deref(),
            changes.agent_title.as_deref(),
            changes.avatar.as_deref(),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))
}

async fn create_owner(
    db_client: &DBClient,
    email: &str,
    incoming: &OwnerDetailsDto,
    avatar: Option<&str>,
) -> Result<User, HttpError> {
    let username = incoming
        .username
        .clone()
        .unwrap_or_else(|| format!("owner_{}", Utc::now().timestamp_millis()));

    // Created owners cannot log in until a real password is set elsewhere
    let placeholder = password::hash(otp::generate_placeholder_password())
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    db_client
        .save_owner_user(
            incoming.full_name.clone().unwrap_or_default(),
            username,
            email.to_string(),
            placeholder,
            incoming.phone_number.clone(),
            incoming.whatsapp_number.clone(),
            Some(
                incoming
                    .agent_title
                    .clone()
                    .unwrap_or_else(|| "Property Agent".to_string()),
            ),
            avatar.map(String::from),
        )
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))
}

/// Create-path resolution: an owner email picks (or creates) a distinct
/// owner; no email means the authenticated caller owns the listing.
pub async fn resolve_property_owner(
    db_client: &DBClient,
    caller: &User,
    incoming: &OwnerDetailsDto,
    avatar: Option<&str>,
) -> Result<User, HttpError> {
    let email = match incoming.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => email,
        None => return Ok(caller.clone()),
    };

    let existing = db_client
        .get_user(None, None, Some(email))
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match existing {
        Some(owner) => {
            let changes = OwnerChangeSet::diff(&owner, incoming, avatar);
            apply_changes(db_client, owner, changes).await
        }
        None => create_owner(db_client, email, incoming, avatar).await,
    }
}

/// Update-path resolution: start from the property's current owner; a
/// dangling reference falls back to the create-or-use-caller logic.
pub async fn resolve_property_owner_for_update(
    db_client: &DBClient,
    caller: &User,
    current_owner_id: uuid::Uuid,
    incoming: &OwnerDetailsDto,
    avatar: Option<&str>,
) -> Result<User, HttpError> {
    let current = db_client
        .get_user(Some(current_owner_id), None, None)
        .await
        .map_err(|e| HttpError::server_error(e.to_string()))?;

    match current {
        Some(owner) => {
            let changes = OwnerChangeSet::diff_for_update(&owner, incoming, avatar);
            apply_changes(db_client, owner, changes).await
        }
        None => match incoming.email.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(email) => create_owner(db_client, email, incoming, avatar).await,
            None => Ok(caller.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn stored_owner() -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Ada Obi".to_string(),
            username: "ada_obi".to_string(),
            email: "ada@example.com".to_string(),
            password: "hashed".to_string(),
            phone_number: Some("+2348010000000".to_string()),
            whatsapp_number: None,
            agent_title: Some("Property Agent".to_string()),
            avatar: None,
            is_verified: true,
            otp: None,
            otp_expires_at: None,
            refresh_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn identical_incoming_details_produce_no_changes() {
        let owner = stored_owner();
        let incoming = OwnerDetailsDto {
            email: Some("ada@example.com".to_string()),
            full_name: Some("Ada Obi".to_string()),
            username: Some("ada_obi".to_string()),
            phone_number: Some("+2348010000000".to_string()),
            whatsapp_number: None,
            agent_title: Some("Property Agent".to_string()),
        };

        let changes = OwnerChangeSet::diff(&owner, &incoming, None);
        assert!(!changes.changed());
        assert_eq!(changes, OwnerChangeSet::default());
    }

    #[test]
    fn only_differing_fields_survive_the_diff() {
        let owner = stored_owner();
        let incoming = OwnerDetailsDto {
            email: Some("ada@example.com".to_string()),
            full_name: Some("Ada Eze".to_string()),
            username: Some("ada_obi".to_string()),
            phone_number: Some("+2348099999999".to_string()),
            whatsapp_number: None,
            agent_title: None,
        };

        let changes = OwnerChangeSet::diff(&owner, &incoming, None);
        assert!(changes.changed());
        assert_eq!(changes.full_name.as_deref(), Some("Ada Eze"));
        assert_eq!(changes.phone_number.as_deref(), Some("+2348099999999"));
        assert!(changes.username.is_none());
        assert!(changes.agent_title.is_none());
        assert!(changes.email.is_none());
    }

    #[test]
    fn blank_values_never_count_as_changes() {
        let owner = stored_owner();
        let incoming = OwnerDetailsDto {
            full_name: Some("   ".to_string()),
            username: Some("".to_string()),
            ..Default::default()
        };

        let changes = OwnerChangeSet::diff(&owner, &incoming, Some(""));
        assert!(!changes.changed());
    }

    #[test]
    fn avatar_counts_once_it_differs_from_the_stored_one() {
        let mut owner = stored_owner();
        let incoming = OwnerDetailsDto::default();

        let changes =
            OwnerChangeSet::diff(&owner, &incoming, Some("https://cdn.example.com/a.png"));
        assert_eq!(
            changes.avatar.as_deref(),
            Some("https://cdn.example.com/a.png")
        );

        owner.avatar = Some("https://cdn.example.com/a.png".to_string());
        let changes =
            OwnerChangeSet::diff(&owner, &incoming, Some("https://cdn.example.com/a.png"));
        assert!(!changes.changed());
    }

    #[test]
    fn update_diff_also_considers_the_email() {
        let owner = stored_owner();
        let incoming = OwnerDetailsDto {
            email: Some("new-ada@example.com".to_string()),
            ..Default::default()
        };

        let create_side = OwnerChangeSet::diff(&owner, &incoming, None);
        assert!(!create_side.changed());

        let update_side = OwnerChangeSet::diff_for_update(&owner, &incoming, None);
        assert_eq!(update_side.email.as_deref(), Some("new-ada@example.com"));
        assert!(update_side.changed());
    }
}
