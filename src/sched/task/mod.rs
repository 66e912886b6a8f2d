//! Task management module

pub mod accounting;
pub mod entity;
pub mod lifecycle;
pub mod state;
pub mod table;

pub use accounting::Accounting;
pub use entity::{ExecStack, KernelEntry, Task, TASK_NAME_LEN};
pub use lifecycle::Action;
pub use state::TaskState;
pub use table::{SlotId, TaskTable};
