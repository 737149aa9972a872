/// Accounts synced from an external identity provider
///
/// The identity provider calls the sync endpoint after sign-up or sign-in.
/// A user is matched by identity-provider ID first, then by email (linking
/// the ID to a password account registered with the same address), and
/// created as a student otherwise.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Classroom, ClassroomError, ClassroomResult};
use crate::models::user::{normalize_email, CreateUser, User, UserRole};
use crate::store::StoreError;

/// Identity-provider profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalProfile {
    pub external_id: String,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Result of a sync
#[derive(Debug, Clone)]
pub struct SyncedUser {
    pub user: User,

    /// True if the account was created by this sync
    pub created: bool,
}

impl Classroom {
    /// Finds, links, or creates the account for an identity-provider profile
    ///
    /// Concurrent syncs of the same new profile race on the unique external
    /// ID and email; the loser re-reads and returns the winner's account.
    pub async fn sync_user(&self, profile: ExternalProfile) -> ClassroomResult<SyncedUser> {
        let external_id = profile.external_id.trim();
        if external_id.is_empty() {
            return Err(ClassroomError::validation("externalId", "must not be empty"));
        }
        let email = normalize_email(&profile.email);
        if email.is_empty() {
            return Err(ClassroomError::validation("email", "must not be empty"));
        }

        if let Some(user) = self.find_or_link(external_id, &email).await? {
            return Ok(SyncedUser {
                user,
                created: false,
            });
        }

        let name = profile
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_name(&email));

        let created = self
            .store
            .create_user(CreateUser {
                name,
                email: email.clone(),
                password_hash: None,
                external_id: Some(external_id.to_string()),
                avatar_url: profile.avatar_url,
                role: UserRole::Student,
            })
            .await;

        match created {
            Ok(user) => {
                info!(user_id = %user.id, "Created account from identity provider");
                Ok(SyncedUser {
                    user,
                    created: true,
                })
            }
            Err(StoreError::Conflict(what)) => {
                debug!(external_id, %what, "Sync lost a create race, re-reading");
                let user = self
                    .find_or_link(external_id, &email)
                    .await?
                    .ok_or(StoreError::Conflict(what))?;
                Ok(SyncedUser {
                    user,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The account carrying an identity-provider ID
    pub async fn external_user(&self, external_id: &str) -> ClassroomResult<User> {
        self.store
            .find_user_by_external_id(external_id.trim())
            .await?
            .ok_or(ClassroomError::UserNotFound)
    }

    /// Matches by external ID, then links an account with the same email
    async fn find_or_link(&self, external_id: &str, email: &str) -> ClassroomResult<Option<User>> {
        if let Some(user) = self.store.find_user_by_external_id(external_id).await? {
            return Ok(Some(user));
        }

        let Some(existing) = self.store.find_user_by_email(email).await? else {
            return Ok(None);
        };

        let user = self
            .store
            .link_external_id(existing.id, external_id)
            .await?
            .ok_or(ClassroomError::UserNotFound)?;
        info!(user_id = %user.id, "Linked identity-provider account");
        Ok(Some(user))
    }
}

/// The local part of an email address
fn default_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
