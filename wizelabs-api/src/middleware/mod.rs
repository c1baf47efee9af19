/// Tower middleware for the API server
///
/// - `security`: response security headers
/// - `auth`: session authentication for `/v1`

pub mod auth;
pub mod security;
