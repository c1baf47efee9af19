/// Authentication and authorization
///
/// Passwords never reach Wizelabs: people sign in through the identity
/// provider, and once it has verified them we issue our own session tokens.
///
/// # Modules
///
/// - [`roles`]: email-domain role policy
/// - [`login`]: turning a verified identity into a user (and profile)
/// - [`jwt`]: session token issue and validation
/// - [`middleware`]: extracting the caller from a request
/// - [`authorization`]: admin, self and project-editor checks

pub mod authorization;
pub mod jwt;
pub mod login;
pub mod middleware;
pub mod roles;
