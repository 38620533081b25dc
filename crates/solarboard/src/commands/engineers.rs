//! Engineer command handlers.

use tabled::Tabled;

use solarboard_core::{
    Command as CoreCommand, CommandResult, Console, Engineer, EngineerDraft, EngineerPatch,
};

use crate::cli::{EngineerDetails, EngineersArgs, EngineersCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EngineerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Services")]
    services: String,
}

impl From<&Engineer> for EngineerRow {
    fn from(e: &Engineer) -> Self {
        Self {
            id: e.id.clone(),
            name: e.name.clone(),
            email: e.email.clone(),
            phone: output::or_dash(e.phone.as_deref()),
            location: output::or_dash(e.location.as_deref()),
            services: e.services.join(", "),
        }
    }
}

fn detail(e: &Engineer) -> String {
    let mut lines = vec![
        format!("ID:         {}", e.id),
        format!("Name:       {}", e.name),
        format!("Email:      {}", e.email),
        format!("Phone:      {}", output::or_dash(e.phone.as_deref())),
        format!("WhatsApp:   {}", output::or_dash(e.whatsapp.as_deref())),
        format!("Experience: {}", output::or_dash(e.experience.as_deref())),
        format!("Location:   {}", output::or_dash(e.location.as_deref())),
    ];
    if !e.services.is_empty() {
        lines.push(format!("Services:   {}", e.services.join(", ")));
    }
    if let Some(ref d) = e.description {
        lines.push(format!("About:      {d}"));
    }
    lines.join("\n")
}

fn draft(name: String, email: String, phone: String, details: EngineerDetails) -> EngineerDraft {
    EngineerDraft {
        name,
        email,
        phone,
        whatsapp: details.whatsapp,
        experience: details.experience,
        location: details.location,
        description: details.description,
        services: util::non_empty_list(details.services).unwrap_or_default(),
        image: details.image,
    }
}

fn patch(
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    details: EngineerDetails,
) -> EngineerPatch {
    EngineerPatch {
        name,
        email,
        phone,
        whatsapp: details.whatsapp,
        experience: details.experience,
        location: details.location,
        description: details.description,
        services: util::non_empty_list(details.services),
        image: details.image,
    }
}

fn print_engineer(result: CommandResult, global: &GlobalOpts) {
    if let CommandResult::Engineer(e) = result {
        let out = output::render_single(&global.output, &e, detail, |e| e.id.clone());
        output::print_output(&out, global.quiet);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: EngineersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_login(console)?;

    match args.command {
        EngineersCommand::List => {
            let page = console.engineers().await?;
            let out = output::render_list(
                &global.output,
                &page.items,
                |e| EngineerRow::from(e),
                |e| e.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EngineersCommand::Add {
            name,
            email,
            phone,
            details,
        } => {
            let result = console
                .execute(CoreCommand::AddEngineer(draft(name, email, phone, details)))
                .await?;
            util::status(global, "✓ Engineer added");
            print_engineer(result, global);
            Ok(())
        }

        EngineersCommand::Update {
            id,
            name,
            email,
            phone,
            details,
        } => {
            let patch = patch(name, email, phone, details);
            if patch == EngineerPatch::default() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one field flag".into(),
                });
            }
            let result = console
                .execute(CoreCommand::UpdateEngineer { id, patch })
                .await?;
            util::status(global, "✓ Engineer updated");
            print_engineer(result, global);
            Ok(())
        }

        EngineersCommand::Delete { id } => {
            if !util::confirm(&format!("Delete engineer '{id}'?"), global.yes)? {
                return Ok(());
            }
            console.execute(CoreCommand::DeleteEngineer { id }).await?;
            util::status(global, "✓ Engineer deleted");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_services_flag_is_not_sent() {
        let details = EngineerDetails {
            whatsapp: None,
            experience: Some("5".into()),
            location: None,
            description: None,
            services: Some(vec![String::new()]),
            image: None,
        };
        let p = patch(None, None, None, details);
        assert_eq!(p.services, None);
        assert_eq!(p.experience.as_deref(), Some("5"));
    }
}
