//! List, member, recipe and health command handlers

use colored::Colorize;
use rustyline::DefaultEditor;
use serde_json::Value;

use super::{ask_yes_no, print_error, read_line, Line, LoopExit};
use crate::cli::{MemberCommand, RecipeCommand};
use crate::error::{AssistantError, Result};
use crate::flow::{fields, EntityType};
use crate::gateway::{Gateway, MemberInput, RecipeInput};
use crate::render::{format_cell, print_records};

/// Fetch and print every record of a kind
pub async fn list(gateway: &dyn Gateway, entity: EntityType) -> Result<()> {
    let records = gateway.list(entity).await?;
    tracing::debug!("Fetched {} {}", records.len(), entity.plural_label());
    print_records(entity.plural_label(), &records);
    Ok(())
}

/// Search recipes by name and print the matches
pub async fn search_recipes(gateway: &dyn Gateway, query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        return Err(AssistantError::Validation("Search query is required".to_string()).into());
    }
    let records = gateway.search_recipes(query).await?;
    print_records(&format!("Recipes matching '{}'", query), &records);
    Ok(())
}

/// Create a member after local validation
pub async fn add_member(gateway: &dyn Gateway, member: &MemberInput) -> Result<Value> {
    member.validate()?;
    let created = gateway.create_member(member).await?;
    tracing::info!("Added member {}", member.name);
    Ok(created)
}

/// Replace a member's details after local validation
pub async fn update_member(gateway: &dyn Gateway, id: u64, member: &MemberInput) -> Result<Value> {
    member.validate()?;
    let updated = gateway.update_member(id, member).await?;
    tracing::info!("Updated member {}", id);
    Ok(updated)
}

/// Create a recipe after local validation
pub async fn add_recipe(gateway: &dyn Gateway, recipe: &RecipeInput) -> Result<Value> {
    recipe.validate()?;
    let created = gateway.create_recipe(recipe).await?;
    tracing::info!("Added recipe {}", recipe.name);
    Ok(created)
}

fn describe(record: &Value, fallback: &str) -> String {
    match (record.get("name"), record.get("id")) {
        (Some(name), Some(id)) => format!("{} (id {})", format_cell(name), format_cell(id)),
        (Some(name), None) => format_cell(name),
        _ => fallback.to_string(),
    }
}

fn detail(response: &Value, fallback: &str) -> String {
    response
        .get("detail")
        .or_else(|| response.get("message"))
        .map(format_cell)
        .unwrap_or_else(|| fallback.to_string())
}

/// Handle `members` subcommands
pub async fn handle_members(gateway: &dyn Gateway, command: MemberCommand) -> Result<()> {
    match command {
        MemberCommand::Add {
            name,
            gender,
            avatar,
        } => {
            let member = MemberInput::new(name, gender, avatar);
            let created = add_member(gateway, &member).await?;
            println!("{} {}", "Added".green(), describe(&created, &member.name));
        }
        MemberCommand::Update {
            id,
            name,
            gender,
            avatar,
        } => {
            let member = MemberInput::new(name, gender, avatar);
            let updated = update_member(gateway, id, &member).await?;
            println!("{} {}", "Updated".green(), describe(&updated, &member.name));
        }
        MemberCommand::Remove { id } => {
            let response = gateway.delete_member(id).await?;
            tracing::info!("Removed member {}", id);
            println!("{}", detail(&response, "Member deleted").green());
        }
    }
    Ok(())
}

/// Handle `recipes` subcommands
pub async fn handle_recipes(gateway: &dyn Gateway, command: RecipeCommand) -> Result<()> {
    match command {
        RecipeCommand::Search { query } => search_recipes(gateway, &query).await?,
        RecipeCommand::Add {
            name,
            kind,
            description,
        } => {
            let recipe = RecipeInput::new(name, kind, description);
            let created = add_recipe(gateway, &recipe).await?;
            println!("{} {}", "Added".green(), describe(&created, &recipe.name));
        }
    }
    Ok(())
}

/// Check the backend and print its status
pub async fn health(gateway: &dyn Gateway) -> Result<()> {
    let status = gateway.health().await?;
    let text = status
        .get("status")
        .map(format_cell)
        .unwrap_or_else(|| status.to_string());
    println!("{} {}", "Backend:".bold(), text.green());
    Ok(())
}

/// Prompt for each field of a form; `None` means the user backed out
fn prompt_fields(
    rl: &mut DefaultEditor,
    entity: EntityType,
    initial: &[(&str, String)],
) -> Result<Option<Vec<String>>> {
    let mut values = Vec::new();
    for spec in fields::fields_for(entity) {
        let marker = if spec.required { "*" } else { "" };
        let prompt = format!("{}{}: ", spec.display_label(), marker);
        let current = initial
            .iter()
            .find(|(name, _)| *name == spec.name)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default();
        match rl.readline_with_initial(&prompt, (current, "")) {
            Ok(line) if line.trim() == "/back" => return Ok(None),
            Ok(line) => values.push(line),
            Err(rustyline::error::ReadlineError::Interrupted)
            | Err(rustyline::error::ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err.into()),
        }
    }
    Ok(Some(values))
}

fn member_from_form(values: &[String]) -> MemberInput {
    let optional = |i: usize| values.get(i).cloned();
    MemberInput::new(
        values.first().cloned().unwrap_or_default(),
        optional(1),
        optional(2),
    )
}

/// Interactive recipe form
pub async fn recipe_form(rl: &mut DefaultEditor, gateway: &dyn Gateway) -> Result<LoopExit> {
    println!("\n{}", EntityType::Recipe.flow_title().bold());
    let Some(values) = prompt_fields(rl, EntityType::Recipe, &[])? else {
        return Ok(LoopExit::Menu);
    };
    let recipe = RecipeInput::new(
        values.first().cloned().unwrap_or_default(),
        values.get(1).cloned().unwrap_or_default(),
        values.get(2).cloned(),
    );
    let created = add_recipe(gateway, &recipe).await?;
    println!("{} {}\n", "Added".green(), describe(&created, &recipe.name));
    Ok(LoopExit::Menu)
}

fn parse_id(text: &str) -> Result<u64> {
    text.trim()
        .parse()
        .map_err(|_| AssistantError::Validation(format!("Invalid member id: {}", text.trim())).into())
}

/// Interactive family member management
pub async fn members_loop(rl: &mut DefaultEditor, gateway: &dyn Gateway) -> Result<LoopExit> {
    loop {
        let members = gateway.list(EntityType::Member).await?;
        print_records(EntityType::Member.plural_label(), &members);
        println!("  a. Add member   u <id>. Update member   r <id>. Remove member   b. Back\n");

        let line = match read_line(rl, "members> ")? {
            Line::Text(line) => line,
            Line::Interrupted => return Ok(LoopExit::Menu),
            Line::Eof => return Ok(LoopExit::Quit),
        };
        let trimmed = line.trim().to_lowercase();
        let (action, arg) = trimmed.split_once(' ').unwrap_or((trimmed.as_str(), ""));

        let outcome = match action {
            "" => continue,
            "b" | "back" | "/back" => return Ok(LoopExit::Menu),
            "a" | "add" => add_member_form(rl, gateway).await,
            "u" | "update" => update_member_form(rl, gateway, &members, arg).await,
            "r" | "remove" => remove_member_prompt(rl, gateway, arg).await,
            other => {
                println!("{}\n", format!("Unknown option: {}", other).yellow());
                continue;
            }
        };
        if let Err(e) = outcome {
            print_error(&e);
        }
    }
}

async fn add_member_form(rl: &mut DefaultEditor, gateway: &dyn Gateway) -> Result<()> {
    println!("\n{}", EntityType::Member.flow_title().bold());
    if let Some(values) = prompt_fields(rl, EntityType::Member, &[])? {
        let member = member_from_form(&values);
        let created = add_member(gateway, &member).await?;
        println!("{} {}\n", "Added".green(), describe(&created, &member.name));
    }
    Ok(())
}

async fn update_member_form(
    rl: &mut DefaultEditor,
    gateway: &dyn Gateway,
    members: &[Value],
    arg: &str,
) -> Result<()> {
    let id = parse_id(arg)?;
    let existing = members
        .iter()
        .find(|m| m.get("id").and_then(Value::as_u64) == Some(id));
    let initial: Vec<(&str, String)> = ["name", "gender", "avatar"]
        .into_iter()
        .map(|name| {
            let value = existing
                .and_then(|m| m.get(name))
                .map(format_cell)
                .unwrap_or_default();
            (name, value)
        })
        .collect();

    if let Some(values) = prompt_fields(rl, EntityType::Member, &initial)? {
        let member = member_from_form(&values);
        let updated = update_member(gateway, id, &member).await?;
        println!("{} {}\n", "Updated".green(), describe(&updated, &member.name));
    }
    Ok(())
}

async fn remove_member_prompt(rl: &mut DefaultEditor, gateway: &dyn Gateway, arg: &str) -> Result<()> {
    let id = parse_id(arg)?;
    if !ask_yes_no(rl, &format!("Remove member {}?", id))? {
        println!("{}\n", "Cancelled.".yellow());
        return Ok(());
    }
    let response = gateway.delete_member(id).await?;
    println!("{}\n", detail(&response, "Member deleted").green());
    Ok(())
}
