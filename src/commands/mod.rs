/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint.

- `menu`  — the main menu loop (default command)
- `chat`  — interactive chat with destructive-action confirmation
- `flow`  — step flows for creating chores and planning meals
- `records` — list, member, recipe and health commands

The handlers stay thin. State lives in the controllers and every backend
call goes through the `Gateway` trait.
*/

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::Result;

// Special commands parser for the interactive prompts
pub mod special_commands;

// List, member, recipe and health commands
pub mod records;

/// How an interactive loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Go back to the main menu
    Menu,
    /// Leave the program
    Quit,
}

/// One read from the line editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Line {
    Text(String),
    Interrupted,
    Eof,
}

/// Read a line, folding Ctrl-C and Ctrl-D into `Line` variants
pub(crate) fn read_line(rl: &mut DefaultEditor, prompt: &str) -> Result<Line> {
    match rl.readline(prompt) {
        Ok(line) => Ok(Line::Text(line)),
        Err(ReadlineError::Interrupted) => Ok(Line::Interrupted),
        Err(ReadlineError::Eof) => Ok(Line::Eof),
        Err(err) => {
            tracing::error!("Readline error: {:?}", err);
            Err(err.into())
        }
    }
}

/// Ask a yes/no question; anything but y/yes counts as no
pub(crate) fn ask_yes_no(rl: &mut DefaultEditor, question: &str) -> Result<bool> {
    match read_line(rl, &format!("{} (y/n): ", question))? {
        Line::Text(answer) => Ok(matches!(
            answer.trim().to_lowercase().as_str(),
            "y" | "yes"
        )),
        Line::Interrupted | Line::Eof => Ok(false),
    }
}

fn print_banner(title: &str) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", title);
    println!("╚══════════════════════════════════════════════════════════════╝\n");
}

fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), crate::error::user_message(err));
}

// Main menu handler
pub mod menu {
    //! Main menu loop.
    //!
    //! Offers the step flows, the list viewer, member management and chat,
    //! and returns to itself after each one finishes.

    use super::*;
    use crate::config::Config;
    use crate::flow::EntityType;
    use crate::gateway::Gateway;
    use std::sync::Arc;

    /// Entry in the main menu
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum MenuChoice {
        /// Start the chore step flow
        CreateChore,
        /// Start the meal step flow
        PlanMeal,
        /// Show a record list
        View(EntityType),
        /// Manage family members
        Members,
        /// Add a recipe
        AddRecipe,
        /// Chat with the assistant
        Chat,
        /// Leave the program
        Exit,
    }

    const OPTIONS: &[(&str, MenuChoice)] = &[
        ("Create Chore", MenuChoice::CreateChore),
        ("Plan Meal", MenuChoice::PlanMeal),
        ("View Chores", MenuChoice::View(EntityType::Chore)),
        ("View Meals", MenuChoice::View(EntityType::Meal)),
        ("View Recipes", MenuChoice::View(EntityType::Recipe)),
        ("Add Recipe", MenuChoice::AddRecipe),
        ("Family Members", MenuChoice::Members),
        ("Chat with Assistant", MenuChoice::Chat),
        ("Exit", MenuChoice::Exit),
    ];

    impl MenuChoice {
        /// Parse a menu selection by number or by name
        ///
        /// # Examples
        ///
        /// ```
        /// use household_assistant::commands::menu::MenuChoice;
        ///
        /// assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::CreateChore));
        /// assert_eq!(MenuChoice::parse("chat"), Some(MenuChoice::Chat));
        /// assert_eq!(MenuChoice::parse("42"), None);
        /// ```
        pub fn parse(input: &str) -> Option<Self> {
            let lower = input.trim().to_lowercase();
            if let Ok(n) = lower.parse::<usize>() {
                return n.checked_sub(1).and_then(|i| OPTIONS.get(i)).map(|(_, c)| *c);
            }
            match lower.as_str() {
                "chore" | "create chore" => Some(Self::CreateChore),
                "meal" | "plan meal" => Some(Self::PlanMeal),
                "chores" => Some(Self::View(EntityType::Chore)),
                "meals" => Some(Self::View(EntityType::Meal)),
                "recipes" => Some(Self::View(EntityType::Recipe)),
                "recipe" | "add recipe" => Some(Self::AddRecipe),
                "members" | "family" => Some(Self::Members),
                "chat" => Some(Self::Chat),
                "exit" | "quit" | "q" => Some(Self::Exit),
                _ => OPTIONS
                    .iter()
                    .find(|(label, _)| label.to_lowercase() == lower)
                    .map(|(_, c)| *c),
            }
        }
    }

    fn print_menu() {
        println!("{}", "What would you like to do?".bold());
        for (i, (label, _)) in OPTIONS.iter().enumerate() {
            println!("  {}. {}", (i + 1).to_string().cyan(), label);
        }
        println!();
    }

    /// Run the main menu until the user exits
    ///
    /// # Errors
    ///
    /// Returns error only if the line editor cannot be created or fails.
    /// Backend failures are printed and the menu is shown again.
    pub async fn run_menu(config: Config, gateway: Arc<dyn Gateway>) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        print_banner("Household Assistant");

        loop {
            print_menu();
            let line = match read_line(&mut rl, "menu> ")? {
                Line::Text(line) => line,
                Line::Interrupted | Line::Eof => break,
            };
            if line.trim().is_empty() {
                continue;
            }

            let Some(choice) = MenuChoice::parse(&line) else {
                println!("{}\n", format!("Unknown option: {}", line.trim()).yellow());
                continue;
            };
            tracing::debug!("Menu choice: {:?}", choice);

            let outcome = match choice {
                MenuChoice::CreateChore => {
                    flow::flow_loop(&mut rl, gateway.clone(), EntityType::Chore).await
                }
                MenuChoice::PlanMeal => {
                    flow::flow_loop(&mut rl, gateway.clone(), EntityType::Meal).await
                }
                MenuChoice::View(entity) => records::list(gateway.as_ref(), entity)
                    .await
                    .map(|_| LoopExit::Menu),
                MenuChoice::AddRecipe => records::recipe_form(&mut rl, gateway.as_ref()).await,
                MenuChoice::Members => records::members_loop(&mut rl, gateway.as_ref()).await,
                MenuChoice::Chat => chat::chat_loop(&mut rl, gateway.clone(), &config).await,
                MenuChoice::Exit => Ok(LoopExit::Quit),
            };

            match outcome {
                Ok(LoopExit::Menu) => continue,
                Ok(LoopExit::Quit) => break,
                Err(e) => print_error(&e),
            }
        }

        println!("Goodbye!");
        Ok(())
    }

}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Runs a readline loop over `ChatConfirmationController`. While a
    //! removal awaits confirmation the prompt changes to ask for yes/no.

    use super::special_commands::{
        parse_special_command, print_help, CommandError, SpecialCommand,
    };
    use super::*;
    use crate::chat::ChatConfirmationController;
    use crate::chat::Role;
    use crate::config::Config;
    use crate::gateway::Gateway;
    use crate::render::format_chat_message;
    use std::sync::Arc;

    /// Start interactive chat as a top-level command
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use household_assistant::commands::chat;
    /// use household_assistant::config::Config;
    /// use household_assistant::gateway::HttpGateway;
    /// use std::sync::Arc;
    ///
    /// # async fn example() -> household_assistant::error::Result<()> {
    /// let config = Config::default();
    /// let gateway = Arc::new(HttpGateway::new(&config.gateway)?);
    /// chat::run_chat(config, gateway).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run_chat(config: Config, gateway: Arc<dyn Gateway>) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        chat_loop(&mut rl, gateway, &config).await?;
        println!("Goodbye!");
        Ok(())
    }

    /// Chat until the user goes back or exits
    pub async fn chat_loop(
        rl: &mut DefaultEditor,
        gateway: Arc<dyn Gateway>,
        config: &Config,
    ) -> Result<LoopExit> {
        let mut chat =
            ChatConfirmationController::new(gateway.clone(), config.chat.confirmation_failure);
        let show_tags = config.chat.show_stage_tags;

        print_banner("Household Assistant Chat");
        println!("Ask about chores, meals, recipes or family members.");
        println!("Type '/help' for available commands, '/back' for the menu\n");

        loop {
            let prompt = if chat.session().is_awaiting_confirmation() {
                format!("{} ", "confirm (yes/no)>".red().bold())
            } else {
                format!("{} ", "you>".green().bold())
            };

            let line = match read_line(rl, &prompt)? {
                Line::Text(line) => line,
                Line::Interrupted => return Ok(LoopExit::Menu),
                Line::Eof => return Ok(LoopExit::Quit),
            };
            let trimmed = line.trim();
            if trimmed.is_empty() && !chat.session().is_awaiting_confirmation() {
                continue;
            }

            match chat_command(&chat, trimmed) {
                Ok(SpecialCommand::None) => {}
                Ok(SpecialCommand::Back) => return Ok(LoopExit::Menu),
                Ok(SpecialCommand::Exit) => return Ok(LoopExit::Quit),
                Ok(SpecialCommand::Help) => {
                    print_help();
                    continue;
                }
                Ok(SpecialCommand::ShowHistory) => {
                    for message in &chat.session().messages {
                        println!("{}", format_chat_message(message, show_tags));
                    }
                    println!();
                    continue;
                }
                Ok(SpecialCommand::ShowStatus) => {
                    print_status(&chat);
                    continue;
                }
                Ok(SpecialCommand::List(entity)) => {
                    if let Err(e) = records::list(gateway.as_ref(), entity).await {
                        print_error(&e);
                    }
                    continue;
                }
                Err(e) => {
                    println!("{}\n", e.to_string().yellow());
                    continue;
                }
            }

            rl.add_history_entry(trimmed)?;

            match chat.submit(trimmed).await {
                Ok(turn) => {
                    for message in turn.iter().filter(|m| m.role == Role::Bot) {
                        println!("{}\n", format_chat_message(message, show_tags));
                    }
                }
                Err(e) => print_error(&e),
            }
        }
    }

    /// Special command for a chat line
    ///
    /// While a removal waits for yes/no, every line goes to the controller.
    fn chat_command(
        chat: &ChatConfirmationController,
        input: &str,
    ) -> std::result::Result<SpecialCommand, CommandError> {
        if chat.session().is_awaiting_confirmation() {
            Ok(SpecialCommand::None)
        } else {
            parse_special_command(input)
        }
    }

    fn print_status(chat: &ChatConfirmationController) {
        let session = chat.session();
        println!("Messages: {}", session.messages.len());
        match &session.pending_confirmation {
            Some(pending) => println!(
                "Pending:  {} {}",
                "awaiting confirmation".red().bold(),
                pending.message
            ),
            None => println!("Pending:  none"),
        }
        println!();
    }

}

// Step flow handler
pub mod flow {
    //! Step flow handler.
    //!
    //! Renders `StepView`s from `StepFlowController` and reads the user's
    //! answers: one field per turn, then done/edit on the summary.

    use super::special_commands::{parse_prefixed_command, print_help, SpecialCommand};
    use super::*;
    use crate::error::AssistantError;
    use crate::flow::{EntityType, StepFlowController, StepView};
    use crate::gateway::Gateway;
    use crate::render::{field_map_table, print_records};
    use std::sync::Arc;

    /// Action typed at the summary prompt
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SummaryAction {
        /// Create the record
        Confirm,
        /// Open the edit form
        Edit,
    }

    impl SummaryAction {
        /// Parse a summary answer, case-insensitively
        pub fn parse(input: &str) -> Option<Self> {
            match input.trim().to_lowercase().as_str() {
                "done" | "confirm" | "yes" | "y" => Some(Self::Confirm),
                "edit" | "change" => Some(Self::Edit),
                _ => None,
            }
        }
    }

    enum Command {
        Answer(String),
        Handled,
        Exit(LoopExit),
    }

    /// Run one flow as a top-level command
    pub async fn run_flow(gateway: Arc<dyn Gateway>, entity: EntityType) -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        flow_loop(&mut rl, gateway, entity).await?;
        Ok(())
    }

    /// Drive a step flow until it is created, fails, or the user leaves
    pub async fn flow_loop(
        rl: &mut DefaultEditor,
        gateway: Arc<dyn Gateway>,
        entity: EntityType,
    ) -> Result<LoopExit> {
        let mut flow = StepFlowController::new(gateway.clone());
        print_banner(entity.flow_title());
        println!("Type '/back' at any time to return to the menu.\n");

        let mut view = flow.start(entity).await?;

        loop {
            match view {
                StepView::Idle => return Ok(LoopExit::Menu),

                StepView::Collecting {
                    ref prompt,
                    ref suggestions,
                    ..
                } => {
                    if !suggestions.is_empty() {
                        print_records("Similar recipes", suggestions);
                    }
                    println!("{}", prompt.bold());

                    let answer = match read_command(rl, "> ", &flow, gateway.as_ref()).await? {
                        Command::Answer(answer) => answer,
                        Command::Handled => continue,
                        Command::Exit(exit) => {
                            flow.cancel();
                            return Ok(exit);
                        }
                    };

                    match flow.submit_field(&answer).await {
                        Ok(next) => view = next,
                        Err(e) if is_validation(&e) => println!("{}\n", e.to_string().yellow()),
                        Err(e) => return Err(e),
                    }
                }

                StepView::Confirming {
                    entity,
                    ref summary,
                    ref prompt,
                } => {
                    println!("\n{}", format!("{} summary", entity.label()).bold());
                    field_map_table(entity, summary).printstd();
                    println!("\n{}", prompt);

                    let answer = match read_command(rl, "> ", &flow, gateway.as_ref()).await? {
                        Command::Answer(answer) => answer,
                        Command::Handled => continue,
                        Command::Exit(exit) => {
                            flow.cancel();
                            return Ok(exit);
                        }
                    };

                    match SummaryAction::parse(&answer) {
                        Some(SummaryAction::Confirm) => view = flow.confirm().await?,
                        Some(SummaryAction::Edit) => match edit_form(rl, &mut flow)? {
                            Some(next) => view = next,
                            None => {
                                flow.cancel();
                                return Ok(LoopExit::Menu);
                            }
                        },
                        None => println!(
                            "{}\n",
                            "Type 'done' to confirm, 'edit' to make changes, or '/back'.".yellow()
                        ),
                    }
                }

                StepView::Created {
                    entity,
                    ref message,
                    ref id,
                } => {
                    println!(
                        "\n{} {} (id {})\n",
                        "✓".green().bold(),
                        message.green(),
                        id.cyan()
                    );
                    if ask_yes_no(rl, &format!("View all {}?", entity.plural_label().to_lowercase()))? {
                        records::list(gateway.as_ref(), entity).await?;
                    }
                    flow.cancel();
                    return Ok(LoopExit::Menu);
                }

                StepView::Failed { ref message, .. } => {
                    eprintln!("\n{} {}\n", "Error:".red().bold(), message);
                    let _ = read_line(rl, "Press Enter to go back to the menu")?;
                    flow.cancel();
                    return Ok(LoopExit::Menu);
                }
            }
        }
    }

    fn is_validation(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<AssistantError>(),
            Some(AssistantError::Validation(_))
        )
    }

    async fn read_command(
        rl: &mut DefaultEditor,
        prompt: &str,
        flow: &StepFlowController,
        gateway: &dyn Gateway,
    ) -> Result<Command> {
        let line = match read_line(rl, prompt)? {
            Line::Text(line) => line,
            Line::Interrupted => return Ok(Command::Exit(LoopExit::Menu)),
            Line::Eof => return Ok(Command::Exit(LoopExit::Quit)),
        };

        match parse_prefixed_command(&line) {
            Ok(SpecialCommand::None) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.trim())?;
                }
                Ok(Command::Answer(line))
            }
            Ok(SpecialCommand::Back) => Ok(Command::Exit(LoopExit::Menu)),
            Ok(SpecialCommand::Exit) => Ok(Command::Exit(LoopExit::Quit)),
            Ok(SpecialCommand::Help) => {
                print_help();
                Ok(Command::Handled)
            }
            Ok(SpecialCommand::ShowStatus) => {
                let session = flow.session();
                println!(
                    "Stage: {}",
                    session
                        .stage
                        .map_or_else(|| "none".to_string(), |s| s.colored_tag())
                );
                if let Some(entity) = session.mode {
                    field_map_table(entity, &session.current_data).printstd();
                }
                println!();
                Ok(Command::Handled)
            }
            Ok(SpecialCommand::ShowHistory) => {
                println!("{}\n", "History is only available in chat.".yellow());
                Ok(Command::Handled)
            }
            Ok(SpecialCommand::List(entity)) => {
                if let Err(e) = records::list(gateway, entity).await {
                    print_error(&e);
                }
                Ok(Command::Handled)
            }
            Err(e) => {
                println!("{}\n", e.to_string().yellow());
                Ok(Command::Handled)
            }
        }
    }

    /// Show the edit form; `None` means the user left with Ctrl-C
    fn edit_form(rl: &mut DefaultEditor, flow: &mut StepFlowController) -> Result<Option<StepView>> {
        let form = flow.edit()?;
        println!("\n{}", "Edit the values and press Enter to keep each one.".bold());

        let mut values: Vec<(String, String)> = form
            .fields
            .iter()
            .map(|f| (f.spec.name.to_string(), f.value.clone()))
            .collect();

        loop {
            for (field, (_, value)) in form.fields.iter().zip(values.iter_mut()) {
                let marker = if field.spec.required { "*" } else { "" };
                let prompt = format!("{}{}: ", field.spec.display_label(), marker);
                match rl.readline_with_initial(&prompt, (value.as_str(), "")) {
                    Ok(line) => *value = line,
                    Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                    Err(err) => return Err(err.into()),
                }
            }

            match flow.submit_edit(&values) {
                Ok(view) => return Ok(Some(view)),
                Err(e) if is_validation(&e) => println!("{}\n", e.to_string().yellow()),
                Err(e) => return Err(e),
            }
        }
    }

}
