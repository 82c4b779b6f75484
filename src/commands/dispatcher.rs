use super::{
    handler::{
        ClearCommand, HelpCommand, ModelCommand, QuitCommand, SystemPromptCommand,
        TemperatureCommand,
    },
    registry::CommandRegistry,
};
use crate::core::error::ChatError;
use crate::session::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandDispatcher {
    registry: Arc<CommandRegistry>,
}

impl CommandDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    pub fn execute(
        &self,
        command: &str,
        args: &[&str],
        session: &mut Session,
    ) -> Result<Option<String>, ChatError> {
        self.registry.execute(command, args, session)
    }

    pub fn get_command_names(&self) -> Vec<String> {
        self.registry.get_command_names()
    }
}

pub fn create_command_registry() -> CommandDispatcher {
    let mut registry = CommandRegistry::new();

    registry.register("quit", QuitCommand);
    registry.register("help", HelpCommand);
    registry.register("clear", ClearCommand);
    registry.register("model", ModelCommand);
    registry.register("temperature", TemperatureCommand);
    registry.register("system", SystemPromptCommand);

    CommandDispatcher::new(Arc::new(registry))
}
