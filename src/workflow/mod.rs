pub mod session_flow;
pub mod session_state;

pub use session_flow::{AuthenticatedPage, SessionFlow};
pub use session_state::SessionState;
