/// Database models for the user management service
///
/// Each model carries its row type, its public projection and the SQL that
/// reads and writes it. Stores never call these directly; they go through the
/// repository traits in [`crate::repository`].
///
/// # Models
///
/// - `user`: accounts with salted password hashes
/// - `group`: named collections of users
/// - `membership`: user-to-group links (at most one active per user)

pub mod group;
pub mod membership;
pub mod user;
