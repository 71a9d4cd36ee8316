mod config;
mod errors;
mod repository;
mod types;

pub use config::UserStoreConfig;
pub use errors::UserError;
pub use repository::{UserRepository, authenticator_id_user_id_key, name_id_key, user_key};
pub use types::{Authenticator, OidcAccount, User};
