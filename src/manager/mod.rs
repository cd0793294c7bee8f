pub mod definition;
pub mod poll;
pub mod registry;
pub mod task_template;
