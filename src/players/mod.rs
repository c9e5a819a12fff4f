mod directory;
mod identity;

pub use directory::{normalize_name, to_last_first, PlayerDirectory};
pub use identity::PlayerIdentity;
