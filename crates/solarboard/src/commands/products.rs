//! Product moderation handlers.

use tabled::Tabled;

use solarboard_core::{Command as CoreCommand, CommandResult, Console, Product, ProductStatus};

use crate::cli::{GlobalOpts, ProductStatusFilter, ProductsArgs, ProductsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn row(p: &Product, color: bool) -> ProductRow {
    ProductRow {
        id: p.id.clone(),
        name: p.name.clone(),
        price: price(p),
        city: output::or_dash(p.city.as_deref()),
        status: output::product_status(p.status, color),
    }
}

fn price(p: &Product) -> String {
    match (p.price.as_deref(), p.currency.as_deref()) {
        (Some(amount), Some(currency)) => format!("{amount} {currency}"),
        (Some(amount), None) => amount.to_owned(),
        _ => "-".into(),
    }
}

fn detail(p: &Product, color: bool) -> String {
    let mut lines = vec![
        format!("ID:        {}", p.id),
        format!("Name:      {}", p.name),
        format!("Status:    {}", output::product_status(p.status, color)),
        format!("Price:     {}", price(p)),
        format!("Type:      {}", output::or_dash(p.kind.as_deref())),
        format!("Condition: {}", output::or_dash(p.condition.as_deref())),
        format!(
            "Location:  {}",
            match (p.city.as_deref(), p.governorate.as_deref()) {
                (Some(city), Some(gov)) => format!("{city}, {gov}"),
                (city, gov) => output::or_dash(city.or(gov)),
            }
        ),
        format!("Phone:     {}", output::or_dash(p.phone.as_deref())),
    ];
    if let Some(ref reason) = p.rejection_reason {
        lines.push(format!("Rejected:  {reason}"));
    }
    if !p.images.is_empty() {
        lines.push(format!("Images:    {}", p.images.len()));
    }
    if let Some(ref d) = p.description {
        lines.push(format!("About:     {d}"));
    }
    lines.join("\n")
}

fn matches_filter(p: &Product, filter: Option<ProductStatusFilter>) -> bool {
    match filter {
        None => true,
        Some(ProductStatusFilter::Pending) => p.status == ProductStatus::Pending,
        Some(ProductStatusFilter::Approved) => p.status == ProductStatus::Approved,
        Some(ProductStatusFilter::Rejected) => p.status == ProductStatus::Rejected,
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    console: &Console,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::require_login(console)?;
    let color = output::should_color(&global.color);

    let cmd = match args.command {
        ProductsCommand::List { status } => {
            let page = console.products().await?;
            let shown: Vec<Product> = page
                .items
                .iter()
                .filter(|p| matches_filter(p, status))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &shown,
                |p| row(p, color),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        ProductsCommand::Get { id } => {
            let product = console
                .product(Some(&id))
                .await?
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "product".into(),
                    identifier: id.clone(),
                    list_command: "products list".into(),
                })?;
            let out = output::render_single(
                &global.output,
                product.as_ref(),
                |p| detail(p, color),
                |p| p.id.clone(),
            );
            output::print_output(&out, global.quiet);
            return Ok(());
        }

        ProductsCommand::Approve { id } => CoreCommand::ApproveProduct { id },

        ProductsCommand::Reject { id, reason } => {
            if !util::confirm(&format!("Reject product '{id}'?"), global.yes)? {
                return Ok(());
            }
            CoreCommand::RejectProduct { id, reason }
        }
    };

    if let CommandResult::Product(p) = console.execute(cmd).await? {
        util::status(global, &format!("✓ Product {} is now {}", p.id, p.status));
        let out = output::render_single(&global.output, &p, |p| detail(p, color), |p| p.id.clone());
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
