pub mod pending_deletion;
pub mod task;
pub mod task_list;

pub use pending_deletion::Entity as PendingDeletion;
pub use task::Entity as Task;
pub use task_list::Entity as TaskList;
