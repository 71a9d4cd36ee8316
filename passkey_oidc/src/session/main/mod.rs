mod cookie;
mod session;

pub use cookie::{
    expired_session_cookie_header, new_session_id, session_cookie_header, session_id_from_headers,
    sign_session_id, verify_signed_session_id,
};
pub use session::{Loaded, Session, SessionState, Unloaded};
