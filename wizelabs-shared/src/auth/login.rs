/// Completing a verified login
///
/// Called once the identity provider has vouched for an email. Creates or
/// refreshes the user, decides its role and makes sure employees have a
/// profile row before their first request.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::roles::RolePolicy;
use crate::models::normalize_email;
use crate::models::profile::Profile;
use crate::models::user::{CreateUser, User, UserRole};

/// What the identity provider tells us about the person signing in
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    pub email: String,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
}

impl VerifiedIdentity {
    /// First and last name, falling back to splitting `name`, then to the
    /// email's local part
    pub fn split_name(&self) -> (String, String) {
        let given = self.given_name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let family = self.family_name.as_deref().map(str::trim).filter(|s| !s.is_empty());

        if let Some(given) = given {
            return (given.to_string(), family.unwrap_or_default().to_string());
        }

        if let Some(name) = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            return match name.split_once(char::is_whitespace) {
                Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
                None => (name.to_string(), String::new()),
            };
        }

        let local = self.email.split('@').next().unwrap_or_default();
        (local.to_string(), String::new())
    }

    fn display_name(&self) -> Option<String> {
        match self.name.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Some(name.to_string()),
            None => {
                let (first, last) = self.split_name();
                Some(format!("{} {}", first, last).trim().to_string()).filter(|s| !s.is_empty())
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub profile_id: Option<Uuid>,
    pub created: bool,
}

/// Role a user ends up with after this login
///
/// Admins keep their grant; everyone else follows the domain policy so a
/// changed email domain is picked up on the next login.
pub fn resolve_role(existing: Option<UserRole>, email: &str, policy: &RolePolicy) -> UserRole {
    match existing {
        Some(UserRole::Admin) => UserRole::Admin,
        _ => policy.role_for_email(email),
    }
}

/// Creates or refreshes the user behind a verified identity
///
/// Errors are logged here and returned to the caller unchanged.
pub async fn complete_login(
    pool: &PgPool,
    identity: &VerifiedIdentity,
    policy: &RolePolicy,
) -> Result<LoginOutcome, sqlx::Error> {
    let email = normalize_email(&identity.email);
    let name = identity.display_name();

    let result = async {
        let existing = User::find_by_email(pool, &email).await?;
        let role = resolve_role(existing.as_ref().map(|u| u.role), &email, policy);

        let (user, created) = match existing {
            Some(user) => {
                if user.role != role {
                    tracing::info!(
                        user_id = %user.id,
                        from = %user.role,
                        to = %role,
                        "Role changed at login"
                    );
                }
                (User::record_login(pool, user.id, name.as_deref(), role).await?, false)
            }
            None => {
                let user = User::create(
                    pool,
                    CreateUser {
                        email: email.clone(),
                        name: name.clone(),
                        role,
                    },
                )
                .await?;
                tracing::info!(user_id = %user.id, role = %role, "Created user at first login");
                (User::record_login(pool, user.id, None, role).await?, true)
            }
        };

        let profile_id = if user.role.has_profile() {
            let (first_name, last_name) = identity.split_name();
            let profile = Profile::ensure_exists(
                pool,
                &email,
                &first_name,
                &last_name,
                identity.picture.as_deref(),
            )
            .await?;
            Some(profile.id)
        } else {
            None
        };

        Ok::<_, sqlx::Error>(LoginOutcome {
            user,
            profile_id,
            created,
        })
    }
    .await;

    if let Err(ref e) = result {
        tracing::error!(email = %email, error = %e, "Failed to complete login");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(email: &str) -> VerifiedIdentity {
        VerifiedIdentity {
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_admin_keeps_role() {
        let policy = RolePolicy::new("wizeline.com", Vec::<String>::new());

        assert_eq!(
            resolve_role(Some(UserRole::Admin), "ana@gmail.com", &policy),
            UserRole::Admin
        );
        assert_eq!(
            resolve_role(Some(UserRole::Applicant), "ana@wizeline.com", &policy),
            UserRole::User
        );
        assert_eq!(resolve_role(None, "ana@gmail.com", &policy), UserRole::Applicant);
    }

    #[test]
    fn test_split_name_prefers_given_family() {
        let id = VerifiedIdentity {
            given_name: Some("Ana".to_string()),
            family_name: Some("de la Cruz".to_string()),
            name: Some("Ignored Name".to_string()),
            ..identity("ana@wizeline.com")
        };
        assert_eq!(id.split_name(), ("Ana".to_string(), "de la Cruz".to_string()));
    }

    #[test]
    fn test_split_name_from_full_name() {
        let id = VerifiedIdentity {
            name: Some("Ana María López".to_string()),
            ..identity("ana@wizeline.com")
        };
        assert_eq!(id.split_name(), ("Ana".to_string(), "María López".to_string()));
    }

    #[test]
    fn test_split_name_falls_back_to_email() {
        assert_eq!(
            identity("ana.lopez@wizeline.com").split_name(),
            ("ana.lopez".to_string(), String::new())
        );
        assert_eq!(
            identity("ana.lopez@wizeline.com").display_name(),
            Some("ana.lopez".to_string())
        );
    }
}
