mod session;
mod token;

pub use session::{JsonTokenStore, MemoryTokenStore, StoredSession, TokenStore};
pub use token::BearerToken;
