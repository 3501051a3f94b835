pub mod contact_message;
pub mod project;
pub mod resume;
pub mod user;

pub use contact_message::ContactMessage;
pub use project::{Project, ProjectWithTechnologies};
pub use resume::Resume;
pub use user::{PublicUser, User};
