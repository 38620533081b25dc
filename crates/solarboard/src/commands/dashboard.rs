//! Dashboard handlers.
//!
//! Counts are an ordinary cached query. Analytics and activities are
//! disabled queries, so a one-shot CLI run always forces the fetch.

use tabled::Tabled;

use solarboard_core::{Activity, Console, DashboardCounts};

use crate::cli::{DashboardArgs, DashboardCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct CounterRow {
    #[tabled(rename = "Counter")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Activity> for ActivityRow {
    fn from(a: &Activity) -> Self {
        Self {
            when: a
                .created_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".into()),
            kind: output::or_dash(a.kind.as_deref()),
            message: output::or_dash(a.message.as_deref()),
        }
    }
}

fn counters(c: &DashboardCounts) -> Vec<CounterRow> {
    let mut rows = vec![
        CounterRow {
            name: "Pending approvals".into(),
            value: c.pending_approvals.to_string(),
        },
        CounterRow {
            name: "Engineers".into(),
            value: c.total_engineers.to_string(),
        },
        CounterRow {
            name: "Verified shops".into(),
            value: c.verified_shops.to_string(),
        },
        CounterRow {
            name: "Active ads".into(),
            value: c.active_ads.to_string(),
        },
    ];
    rows.extend(c.extra.iter().map(|(name, value)| CounterRow {
        name: name.clone(),
        value: value.to_string(),
    }));
    rows
}

fn counts_detail(c: &DashboardCounts) -> String {
    tabled::Table::new(counters(c))
        .with(tabled::settings::Style::rounded())
        .to_string()
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: DashboardArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_login(console)?;

    match args.command.unwrap_or(DashboardCommand::Counts) {
        DashboardCommand::Counts => {
            let counts = console.dashboard_counts().await?;
            let out = output::render_single(&global.output, counts.as_ref(), counts_detail, |c| {
                c.pending_approvals.to_string()
            });
            output::print_output(&out, global.quiet);
        }

        DashboardCommand::Analytics => {
            let analytics = console.refresh_dashboard_analytics().await?;
            let out = output::render_single(
                &global.output,
                analytics.as_ref(),
                |v| serde_json::to_string_pretty(v).unwrap_or_default(),
                ToString::to_string,
            );
            output::print_output(&out, global.quiet);
        }

        DashboardCommand::Activities => {
            let activities = console.refresh_recent_activities().await?;
            let out = output::render_list(
                &global.output,
                activities.as_slice(),
                |a| ActivityRow::from(a),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
