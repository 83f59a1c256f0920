pub mod auth;
pub mod money;

#[cfg(test)]
pub use auth::create_token;
pub use auth::verify_token;
