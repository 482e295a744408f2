pub mod session;
pub mod task;
pub mod user;

pub use session::{new_session_id, SessionStore};
pub use task::{Task, TaskStore};
pub use user::{CredentialStore, User};
