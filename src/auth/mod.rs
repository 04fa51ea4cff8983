pub mod gate;
pub mod session;
pub mod token;

pub use gate::gate;
pub use session::MemberSession;
pub use token::{AuthError, IssueTokenError, MemberClaims, TokenAuthority};
