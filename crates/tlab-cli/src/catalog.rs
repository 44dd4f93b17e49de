//! # Catalogue Subcommands
//!
//! Browsing workshops, groups, activities, venues, and performances, and
//! enrolling into a workshop.

use anyhow::Result;
use clap::Args;

use tlab_client::activities::ActivityFilter;
use tlab_client::workshops::WorkshopQuery;

use crate::output::{emit, or_dash, truncate};
use crate::Context;

#[derive(Args, Debug)]
pub struct WorkshopsArgs {
    /// Only workshops that have not started yet.
    #[arg(long)]
    pub upcoming: bool,

    /// Free-text search.
    #[arg(long, short)]
    pub search: Option<String>,
}

#[derive(Args, Debug)]
pub struct EnrollArgs {
    /// Workshop ID.
    pub workshop: i64,

    /// Group within the workshop.
    #[arg(long)]
    pub group: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ActivitiesArgs {
    #[arg(long = "type")]
    pub kind: Option<String>,

    #[arg(long)]
    pub age_group: Option<String>,

    /// Weekday, e.g. MONDAY.
    #[arg(long)]
    pub day: Option<String>,
}

#[derive(Args, Debug)]
pub struct GroupsArgs {
    /// Only groups of this workshop.
    #[arg(long)]
    pub workshop: Option<i64>,
}

pub async fn run_workshops(ctx: &Context, args: &WorkshopsArgs) -> Result<u8> {
    let query = WorkshopQuery {
        upcoming: args.upcoming,
        search: args.search.clone(),
    };
    let items = ctx.client.workshops().list(&query).await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|w| {
                format!(
                    "{:>5}  {:<10}  {:<10}  {}",
                    w.id,
                    or_dash(w.start_date),
                    w.status_label(),
                    truncate(w.display_title(), 60)
                )
            })
            .collect()
    })?;
    Ok(0)
}

pub async fn run_enroll(ctx: &Context, args: &EnrollArgs) -> Result<u8> {
    let enrollment = ctx.client.workshops().enroll(args.workshop, args.group).await?;
    emit(ctx.json, &enrollment, |e| {
        vec![format!(
            "Enrolled in workshop {} ({})",
            args.workshop,
            e.status_label()
        )]
    })?;
    Ok(0)
}

pub async fn run_activities(ctx: &Context, args: &ActivitiesArgs) -> Result<u8> {
    let filter = ActivityFilter {
        kind: args.kind.clone(),
        age_group: args.age_group.clone(),
        day: args.day.clone(),
    };
    let items = ctx.client.activities().list(&filter).await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|a| {
                format!(
                    "{:>5}  {:>4} min  {}",
                    a.id,
                    or_dash(a.duration_minutes),
                    a.display_title()
                )
            })
            .collect()
    })?;
    Ok(0)
}

pub async fn run_venues(ctx: &Context) -> Result<u8> {
    let items = ctx.client.venues().list().await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|v| format!("{:>5}  {}  {}", v.id, v.name, v.one_line_address()))
            .collect()
    })?;
    Ok(0)
}

pub async fn run_performances(ctx: &Context) -> Result<u8> {
    let items = ctx.client.performances().list().await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|p| {
                format!(
                    "{:>5}  {:<19}  {}  @ {}",
                    p.id,
                    or_dash(p.performance_date),
                    p.title,
                    or_dash(p.venue.as_deref())
                )
            })
            .collect()
    })?;
    Ok(0)
}

pub async fn run_groups(ctx: &Context, args: &GroupsArgs) -> Result<u8> {
    let items = ctx.client.groups().list(args.workshop).await?;
    emit(ctx.json, &items, |items| {
        items
            .iter()
            .map(|g| {
                format!(
                    "{:>5}  {:<19}  free: {:<4}  {}",
                    g.id,
                    or_dash(g.start_date_time),
                    or_dash(g.free_places()),
                    g.display_title()
                )
            })
            .collect()
    })?;
    Ok(0)
}
