//! Login, logout and whoami.

use solarboard_core::{AdminUser, Console};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(u: &AdminUser) -> String {
    let mut lines = vec![
        format!("ID:          {}", u.id),
        format!("Name:        {}", output::or_dash(u.name.as_deref())),
        format!("Email:       {}", output::or_dash(u.email.as_deref())),
        format!("Role:        {}", output::or_dash(u.role.as_deref())),
    ];
    if !u.permissions.is_empty() {
        lines.push(format!("Permissions: {}", u.permissions.join(", ")));
    }
    lines.join("\n")
}

pub async fn login(
    console: &Console,
    args: LoginArgs,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let cfg = config::load_config_or_default();
    let (email, password) = config::login_credentials(args.email, cfg.profiles.get(profile), profile)?;

    let user = console.login(&email, &password).await?;
    util::status(global, &format!("✓ Signed in as {email} (profile '{profile}')"));

    let out = output::render_single(&global.output, user.as_ref(), detail, |u| u.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn logout(console: &Console, global: &GlobalOpts) {
    let was_signed_in = console.is_authenticated();
    console.logout();
    if was_signed_in {
        util::status(global, "✓ Signed out");
    } else {
        util::status(global, "Not signed in");
    }
}

pub fn whoami(console: &Console, global: &GlobalOpts) -> Result<(), CliError> {
    util::require_login(console)?;
    let user = console.current_user().ok_or_else(|| CliError::NotLoggedIn {
        profile: String::new(),
    })?;
    let out = output::render_single(&global.output, user.as_ref(), detail, |u| u.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
