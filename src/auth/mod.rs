pub mod cookie;
pub mod password;
pub mod token;

pub use cookie::{clear_session_cookie, extract_session_token, session_cookie, SESSION_COOKIE};
pub use password::{PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};
