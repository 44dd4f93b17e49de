//! # Account Subcommands
//!
//! - `tlab login --email <e>` (password from `--password` or `$TLAB_PASSWORD`)
//! - `tlab register --first-name .. --last-name .. --email .. --accept-terms`
//! - `tlab logout`
//! - `tlab whoami`
//! - `tlab enrollments [--cancel <id>]`

use anyhow::{bail, Context as _, Result};
use clap::Args;

use tlab_client::auth::RegistrationForm;

use crate::output::{emit, or_dash};
use crate::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[arg(long, env = "TLAB_EMAIL")]
    pub email: String,

    #[arg(long, env = "TLAB_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long, env = "TLAB_EMAIL")]
    pub email: String,

    #[arg(long, env = "TLAB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Accept the terms of use and the privacy policy.
    #[arg(long)]
    pub accept_terms: bool,
}

#[derive(Args, Debug)]
pub struct EnrollmentsArgs {
    /// Cancel the enrollment with this ID instead of listing.
    #[arg(long)]
    pub cancel: Option<i64>,
}

pub async fn run_login(ctx: &Context, args: &LoginArgs) -> Result<u8> {
    let resp = ctx.client.auth().login(&args.email, &args.password).await?;
    let user = resp.user_summary();
    println!(
        "Logged in as {} ({}), session valid for {}s",
        user.display_name(),
        or_dash(user.role),
        resp.expires_in_secs()
    );
    Ok(0)
}

pub async fn run_register(ctx: &Context, args: &RegisterArgs) -> Result<u8> {
    let form = RegistrationForm {
        first_name: args.first_name.clone(),
        last_name: args.last_name.clone(),
        email: args.email.clone(),
        password: args.password.clone(),
        confirm_password: args.password.clone(),
        accepted_terms: args.accept_terms,
        accepted_privacy: args.accept_terms,
    };
    let resp = ctx.client.auth().register(&form).await?;
    println!("Registered {}", resp.user_summary().display_name());
    Ok(0)
}

pub fn run_logout(ctx: &Context) -> Result<u8> {
    ctx.client.auth().logout();
    println!("Logged out");
    Ok(0)
}

pub async fn run_whoami(ctx: &Context) -> Result<u8> {
    if !ctx.client.session().is_live() {
        bail!("not logged in; run `tlab login`");
    }
    let profile = ctx
        .client
        .users()
        .me()
        .await
        .context("loading profile")?;
    emit(ctx.json, &profile, |p| {
        vec![
            format!("{} <{}>", p.full_name(), p.email),
            format!("role: {}", or_dash(p.role)),
            format!("city: {}", or_dash(p.city.as_deref())),
        ]
    })?;
    Ok(0)
}

pub async fn run_enrollments(ctx: &Context, args: &EnrollmentsArgs) -> Result<u8> {
    if let Some(id) = args.cancel {
        ctx.client.users().cancel_enrollment(id).await?;
        println!("Enrollment {id} cancelled");
        return Ok(0);
    }
    let items = ctx.client.users().my_enrollments().await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|e| {
                format!(
                    "{:>5}  {:<10}  {}",
                    or_dash(e.id),
                    e.status_label(),
                    or_dash(e.workshop_title.as_deref())
                )
            })
            .collect()
    })?;
    Ok(0)
}
