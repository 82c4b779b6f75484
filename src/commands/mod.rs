pub mod dispatcher;
pub mod handler;
pub mod registry;

pub use dispatcher::create_command_registry;
