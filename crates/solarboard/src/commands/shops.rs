//! Shop command handlers.

use tabled::Tabled;

use solarboard_core::{Command as CoreCommand, CommandResult, Console, Shop, ShopDraft, ShopPatch};

use crate::cli::{GlobalOpts, ShopDetails, ShopsArgs, ShopsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ShopRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&Shop> for ShopRow {
    fn from(s: &Shop) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            owner: output::or_dash(s.owner_name.as_deref()),
            phone: output::or_dash(s.phone.as_deref()),
            status: output::or_dash(s.status.as_deref()),
        }
    }
}

fn detail(s: &Shop) -> String {
    let mut lines = vec![
        format!("ID:       {}", s.id),
        format!("Name:     {}", s.name),
        format!("Owner:    {}", output::or_dash(s.owner_name.as_deref())),
        format!("Email:    {}", output::or_dash(s.email.as_deref())),
        format!("Phone:    {}", output::or_dash(s.phone.as_deref())),
        format!("WhatsApp: {}", output::or_dash(s.whatsapp.as_deref())),
        format!("Address:  {}", output::or_dash(s.address.as_deref())),
        format!("Status:   {}", output::or_dash(s.status.as_deref())),
    ];
    if !s.services.is_empty() {
        lines.push(format!("Services: {}", s.services.join(", ")));
    }
    if let Some(ref d) = s.description {
        lines.push(format!("About:    {d}"));
    }
    lines.join("\n")
}

fn print_shop(result: CommandResult, global: &GlobalOpts) {
    if let CommandResult::Shop(s) = result {
        let out = output::render_single(&global.output, &s, detail, |s| s.id.clone());
        output::print_output(&out, global.quiet);
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: ShopsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(console)?;

    match args.command {
        ShopsCommand::List => {
            let page = console.shops().await?;
            let out = output::render_list(
                &global.output,
                &page.items,
                |s| ShopRow::from(s),
                |s| s.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShopsCommand::Get { id } => {
            let shop = console
                .shop(Some(&id))
                .await?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "shop".into(),
                    identifier: id.clone(),
                    list_command: "shops list".into(),
                })?;
            let out = output::render_single(&global.output, shop.as_ref(), detail, |s| s.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ShopsCommand::Add {
            name,
            owner_name,
            email,
            details,
        } => {
            let draft = ShopDraft {
                name,
                owner_name,
                email,
                phone: details.phone,
                whatsapp: details.whatsapp,
                address: details.address,
                description: details.description,
                services: util::non_empty_list(details.services).unwrap_or_default(),
                status: details.status,
            };
            let result = console.execute(CoreCommand::AddShop(draft)).await?;
            util::status(global, "✓ Shop added");
            print_shop(result, global);
            Ok(())
        }

        ShopsCommand::Update {
            id,
            name,
            owner_name,
            email,
            details,
        } => {
            let patch = patch(name, owner_name, email, details);
            if patch == ShopPatch::default() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one field flag".into(),
                });
            }
            let result = console.execute(CoreCommand::UpdateShop { id, patch }).await?;
            util::status(global, "✓ Shop updated");
            print_shop(result, global);
            Ok(())
        }

        ShopsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete shop '{id}'?"), global.yes)? {
                return Ok(());
            }
            console.execute(CoreCommand::DeleteShop { id }).await?;
            util::status(global, "✓ Shop deleted");
            Ok(())
        }
    }
}

fn patch(
    name: Option<String>,
    owner_name: Option<String>,
    email: Option<String>,
    details: ShopDetails,
) -> ShopPatch {
    ShopPatch {
        name,
        owner_name,
        email,
        phone: details.phone,
        whatsapp: details.whatsapp,
        address: details.address,
        description: details.description,
        services: util::non_empty_list(details.services),
        status: details.status,
    }
}
