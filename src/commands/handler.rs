use crate::core::error::ChatError;
use crate::credentials::{list_models, resolve_credentials};
use crate::providers::azure::AzureClient;
use crate::session::Session;

use console::style;

pub trait CommandHandler {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ChatError>;
    fn help(&self) -> &'static str;
}

pub struct QuitCommand;
pub struct HelpCommand;
pub struct ClearCommand;
pub struct ModelCommand;
pub struct TemperatureCommand;
pub struct SystemPromptCommand;

impl CommandHandler for QuitCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ChatError> {
        session.active = false;
        Ok(None)
    }

    fn help(&self) -> &'static str {
        "/quit - Exit the chat"
    }
}

impl CommandHandler for HelpCommand {
    fn execute(
        &self,
        _session: &mut Session,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        let title = style("Available Commands").bold().underlined();
        let help_text = vec![
            title.to_string(),
            style(QuitCommand.help()).to_string(),
            style(HelpCommand.help()).to_string(),
            style(ClearCommand.help()).to_string(),
            style(ModelCommand.help()).to_string(),
            style(TemperatureCommand.help()).to_string(),
            style(SystemPromptCommand.help()).to_string(),
        ]
        .join("\n");

        Ok(Some(help_text))
    }

    fn help(&self) -> &'static str {
        "/help - Show available commands"
    }
}

impl CommandHandler for ClearCommand {
    fn execute(&self, session: &mut Session, _args: &[&str]) -> Result<Option<String>, ChatError> {
        session.reset()?;
        Ok(Some("Conversation cleared.".to_string()))
    }

    fn help(&self) -> &'static str {
        "/clear - Restart the conversation"
    }
}

impl CommandHandler for ModelCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ChatError> {
        let credential_path = session.config.api_config_file.clone();

        if args.is_empty() {
            let models = list_models(&credential_path)?;
            let listing: Vec<String> = models
                .iter()
                .map(|name| {
                    if *name == session.model {
                        format!("* {} (current)", name)
                    } else {
                        format!("  {}", name)
                    }
                })
                .collect();
            return Ok(Some(format!("Available models:\n{}", listing.join("\n"))));
        }

        // Resolve first so a failed switch leaves the session on the
        // model it already had.
        let credential = resolve_credentials(&credential_path, args[0])?;
        session.model = credential.model.clone();
        session.client = Box::new(AzureClient::new(credential));
        Ok(Some(format!("Model changed to: {}", session.model)))
    }

    fn help(&self) -> &'static str {
        "/model <name> - Show the model list or switch models"
    }
}

impl CommandHandler for TemperatureCommand {
    fn execute(&self, session: &mut Session, args: &[&str]) -> Result<Option<String>, ChatError> {
        if args.is_empty() {
            return Ok(Some(format!("Temperature: {:.2}", session.temperature)));
        }

        let value: f64 = args[0]
            .parse()
            .map_err(|_| ChatError::Input(format!("Not a number: {}", args[0])))?;
        if !(0.0..=1.0).contains(&value) {
            return Err(ChatError::Input(format!(
                "Temperature must be between 0.0 and 1.0, got {}",
                args[0]
            )));
        }

        session.temperature = (value * 100.0).round() / 100.0;
        Ok(Some(format!("Temperature set to {:.2}", session.temperature)))
    }

    fn help(&self) -> &'static str {
        "/temperature <value> - Show or set the sampling temperature (0.0 to 1.0)"
    }
}

impl CommandHandler for SystemPromptCommand {
    fn execute(
        &self,
        session: &mut Session,
        _args: &[&str],
    ) -> Result<Option<String>, ChatError> {
        Ok(Some(format!(
            "{}\n{}",
            style("System prompt").bold().underlined(),
            session.system_prompt
        )))
    }

    fn help(&self) -> &'static str {
        "/system - Show the active system prompt"
    }
}
