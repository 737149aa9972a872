/// API route handlers, organized by resource
///
/// - `health`: health check
/// - `auth`: register, login, token refresh
/// - `users`: current user, identity-provider sync
/// - `courses`: create, list, join, get
/// - `people`: add and remove course participants
/// - `content`: announcements, assignments, lectures, chat

pub mod auth;
pub mod content;
pub mod courses;
pub mod health;
pub mod people;
pub mod users;
