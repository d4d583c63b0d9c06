//! Task domain entities.

pub mod attachment;
pub mod model;
pub mod priority;
pub mod status;

pub use attachment::TaskAttachment;
pub use model::Task;
pub use priority::TaskPriority;
pub use status::TaskStatus;
