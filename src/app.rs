use crate::cli::Args;
use crate::commands::{create_command_registry, dispatcher::CommandDispatcher};
use crate::config::AppConfig;
use crate::core::error::ChatError;
use crate::credentials::{list_models, resolve_credentials};
use crate::display::{self, LiveEcho};
use crate::input;
use crate::providers::azure::AzureClient;
use crate::providers::{Message, Role};
use crate::relay;
use crate::session::Session;
use termimad::MadSkin;

pub struct Application {
    session: Session,
    command_dispatcher: CommandDispatcher,
    skin: MadSkin,
}

impl Application {
    pub fn new(args: &Args) -> Result<Self, ChatError> {
        let config = AppConfig::load(&args.config)?;
        let system_prompt = config.read_system_prompt()?;

        let model = match &args.model {
            Some(model) => model.clone(),
            None => list_models(&config.api_config_file)?
                .into_iter()
                .next()
                .ok_or_else(|| {
                    ChatError::Config(format!(
                        "no models configured in {}",
                        config.api_config_file.display()
                    ))
                })?,
        };
        let credential = resolve_credentials(&config.api_config_file, &model)?;

        let temperature = match args.temperature {
            Some(value) if !(0.0..=1.0).contains(&value) => {
                return Err(ChatError::Input(format!(
                    "Temperature must be between 0.0 and 1.0, got {}",
                    value
                )));
            }
            // Same 0.01 step the /temperature command applies.
            Some(value) => (value * 100.0).round() / 100.0,
            None => 0.0,
        };

        let model_name = credential.model.clone();
        let client = Box::new(AzureClient::new(credential));
        let session = Session::new(config, system_prompt, model_name, temperature, client);

        Ok(Self {
            session,
            command_dispatcher: create_command_registry(),
            skin: display::make_skin(),
        })
    }

    pub async fn run(&mut self) -> Result<(), ChatError> {
        display::print_banner(&self.session.config);
        let mut editor = input::create_editor(self.command_dispatcher.clone())?;

        loop {
            // Also fires again after /clear, so the greeting reopens
            // the fresh conversation.
            if let Some(greeting) = self.session.ensure_started() {
                display::print_message(&self.skin, greeting);
            }

            let input = match input::read_input(&mut editor)? {
                Some(input) => input.trim().to_string(),
                None => break,
            };

            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                let parts: Vec<&str> = input[1..].split_whitespace().collect();
                if !parts.is_empty() {
                    let command = parts[0];
                    let args = if parts.len() > 1 { &parts[1..] } else { &[] };

                    match self
                        .command_dispatcher
                        .execute(command, args, &mut self.session)
                    {
                        Ok(Some(output)) => println!("{}", output),
                        Ok(None) => {}
                        Err(e) => display::print_turn_error(&e),
                    }

                    if !self.session.active {
                        break;
                    }
                }
                continue;
            }

            if let Err(e) = self.take_turn(&input).await {
                display::print_turn_error(&e);
            }
        }

        input::save_history(&mut editor)?;
        println!("Goodbye!");
        Ok(())
    }

    /// One user turn: stream into the live block, then replace it with
    /// the committed transcript rendering.
    async fn take_turn(&mut self, input: &str) -> Result<(), ChatError> {
        let mut echo = LiveEcho::new();
        let report = match relay::take_turn(&mut self.session, input, &mut echo).await {
            Ok(report) => report,
            Err(e) => {
                echo.clear();
                return Err(e);
            }
        };

        echo.clear();
        display::print_message(&self.skin, &Message::new(Role::User, report.query));
        display::print_message(&self.skin, &Message::new(Role::Assistant, report.reply));
        if report.truncated {
            display::print_notice(&format!(
                "Input truncated to {} words.",
                self.session.config.max_words_per_query
            ));
        }
        Ok(())
    }
}
