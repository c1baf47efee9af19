/// Role assignment by email domain
///
/// The identity provider only tells us who someone is; what they may do is
/// decided by the domain of their verified email:
///
/// | Domain | Role |
/// |--------|------|
/// | one of the intern domains | `intern` |
/// | the organization domain or a subdomain of it | `user` |
/// | anything else | `applicant` |
///
/// Intern domains are checked first so an intern domain may itself be a
/// subdomain of the organization domain. Matching is case-insensitive.
/// Admins are never derived from the domain; they are granted explicitly.
///
/// # Example
///
/// ```
/// use wizelabs_shared::auth::roles::RolePolicy;
/// use wizelabs_shared::models::user::UserRole;
///
/// let policy = RolePolicy::new("wizeline.com", ["interns.wizeline.com"]);
///
/// assert_eq!(policy.role_for_email("Ana@Wizeline.com"), UserRole::User);
/// assert_eq!(policy.role_for_email("bo@interns.wizeline.com"), UserRole::Intern);
/// assert_eq!(policy.role_for_email("cy@gmail.com"), UserRole::Applicant);
/// ```

use crate::models::user::UserRole;

#[derive(Debug, Clone)]
pub struct RolePolicy {
    org_domain: String,
    intern_domains: Vec<String>,
}

fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_start_matches('@').trim_end_matches('.').to_lowercase()
}

impl RolePolicy {
    pub fn new<I, S>(org_domain: &str, intern_domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            org_domain: normalize_domain(org_domain),
            intern_domains: intern_domains
                .into_iter()
                .map(|d| normalize_domain(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn org_domain(&self) -> &str {
        &self.org_domain
    }

    pub fn role_for_email(&self, email: &str) -> UserRole {
        let Some(domain) = email_domain(email) else {
            return UserRole::Applicant;
        };

        if self.intern_domains.iter().any(|d| *d == domain) {
            return UserRole::Intern;
        }

        if !self.org_domain.is_empty()
            && (domain == self.org_domain || domain.ends_with(&format!(".{}", self.org_domain)))
        {
            return UserRole::User;
        }

        UserRole::Applicant
    }
}

/// Lower-cased domain part of an email, if it has one
pub fn email_domain(email: &str) -> Option<String> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    let domain = normalize_domain(domain);

    if local.is_empty() || domain.is_empty() {
        return None;
    }

    Some(domain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RolePolicy {
        RolePolicy::new("Wizeline.com", ["interns.wizeline.com", "@academy.org"])
    }

    #[test]
    fn test_org_domain_and_subdomains_are_users() {
        let policy = policy();
        assert_eq!(policy.role_for_email("ana@wizeline.com"), UserRole::User);
        assert_eq!(policy.role_for_email("ANA@WIZELINE.COM"), UserRole::User);
        assert_eq!(policy.role_for_email("ana@mx.wizeline.com"), UserRole::User);
    }

    #[test]
    fn test_intern_domains_take_precedence() {
        let policy = policy();
        assert_eq!(policy.role_for_email("bo@interns.wizeline.com"), UserRole::Intern);
        assert_eq!(policy.role_for_email("bo@Academy.org"), UserRole::Intern);
    }

    #[test]
    fn test_lookalike_domains_are_applicants() {
        let policy = policy();
        assert_eq!(policy.role_for_email("x@notwizeline.com"), UserRole::Applicant);
        assert_eq!(policy.role_for_email("x@wizeline.com.evil.io"), UserRole::Applicant);
        assert_eq!(policy.role_for_email("x@gmail.com"), UserRole::Applicant);
    }

    #[test]
    fn test_malformed_emails_are_applicants() {
        let policy = policy();
        assert_eq!(policy.role_for_email("wizeline.com"), UserRole::Applicant);
        assert_eq!(policy.role_for_email("@wizeline.com"), UserRole::Applicant);
        assert_eq!(policy.role_for_email("ana@"), UserRole::Applicant);
    }

    #[test]
    fn test_empty_org_domain_matches_nothing() {
        let policy = RolePolicy::new("", Vec::<String>::new());
        assert_eq!(policy.role_for_email("ana@wizeline.com"), UserRole::Applicant);
    }

    #[test]
    fn test_email_domain() {
        assert_eq!(email_domain(" Ana@Wizeline.COM "), Some("wizeline.com".to_string()));
        assert_eq!(email_domain("no-at-sign"), None);
    }
}
