//! Project domain entities.

pub mod member;
pub mod model;
pub mod status;

pub use member::ProjectMember;
pub use model::Project;
pub use status::ProjectStatus;
