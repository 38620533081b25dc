//! Advertisement handlers. `--image` uploads the file to the media host
//! before the ad record is written.

use tabled::Tabled;

use solarboard_core::{Ad, AdDraft, AdPatch, Command as CoreCommand, CommandResult, Console};

use crate::cli::{AdsArgs, AdsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AdRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Runs")]
    runs: String,
    #[tabled(rename = "Image")]
    image: String,
}

impl From<&Ad> for AdRow {
    fn from(a: &Ad) -> Self {
        Self {
            id: a.id.clone(),
            title: a.title.clone(),
            status: output::or_dash(a.status.as_deref()),
            runs: runs(a),
            image: if a.image().is_empty() { "no" } else { "yes" }.into(),
        }
    }
}

fn runs(a: &Ad) -> String {
    match (a.start_date.as_deref(), a.end_date.as_deref()) {
        (None, None) => "-".into(),
        (start, end) => format!("{} → {}", start.unwrap_or("…"), end.unwrap_or("…")),
    }
}

fn detail(a: &Ad) -> String {
    [
        format!("ID:          {}", a.id),
        format!("Title:       {}", a.title),
        format!("Description: {}", a.description),
        format!("Status:      {}", output::or_dash(a.status.as_deref())),
        format!("Runs:        {}", runs(a)),
        format!("Link:        {}", output::or_dash(a.link.as_deref())),
        format!("Image:       {}", output::or_dash(Some(a.image()))),
    ]
    .join("\n")
}

async fn run(
    console: &Console,
    cmd: CoreCommand,
    uploading: bool,
    done: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let spinner = uploading.then(|| util::spinner(global, "Uploading image…"));
    let result = console.execute(cmd).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    if let CommandResult::Ad(ad) = result? {
        util::status(global, done);
        let out = output::render_single(&global.output, &ad, detail, |a| a.id.clone());
        output::print_output(&out, global.quiet);
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(console: &Console, args: AdsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(console)?;

    match args.command {
        AdsCommand::List => {
            let page = console.ads().await?;
            let out = output::render_list(
                &global.output,
                &page.items,
                |a| AdRow::from(a),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AdsCommand::Create {
            title,
            description,
            image,
            details,
        } => {
            let draft = AdDraft {
                title,
                description,
                image_url: String::new(),
                link: details.link,
                start_date: details.start_date,
                end_date: details.end_date,
                status: details.status,
            };
            let uploading = image.is_some();
            run(
                console,
                CoreCommand::CreateAd { draft, image },
                uploading,
                "✓ Ad created",
                global,
            )
            .await
        }

        AdsCommand::Update {
            id,
            title,
            description,
            image,
            details,
        } => {
            let patch = AdPatch {
                title,
                description,
                image_url: None,
                link: details.link,
                start_date: details.start_date,
                end_date: details.end_date,
                status: details.status,
            };
            if patch == AdPatch::default() && image.is_none() {
                return Err(CliError::Validation {
                    field: "update".into(),
                    reason: "nothing to change; pass at least one field flag or --image".into(),
                });
            }
            let uploading = image.is_some();
            run(
                console,
                CoreCommand::UpdateAd { id, patch, image },
                uploading,
                "✓ Ad updated",
                global,
            )
            .await
        }

        AdsCommand::Delete { id } => {
            if !util::confirm(&format!("Delete ad '{id}'?"), global.yes)? {
                return Ok(());
            }
            console.execute(CoreCommand::DeleteAd { id }).await?;
            util::status(global, "✓ Ad deleted");
            Ok(())
        }
    }
}
