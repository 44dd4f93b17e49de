//! `tlab feedback`: send the contact form.

use anyhow::Result;
use clap::{Args, ValueEnum};

use tlab_client::feedback::{FeedbackForm, FeedbackType};

use crate::output::emit;
use crate::Context;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeedbackKind {
    General,
    Bug,
    Suggestion,
    Praise,
}

impl From<FeedbackKind> for FeedbackType {
    fn from(kind: FeedbackKind) -> Self {
        match kind {
            FeedbackKind::General => FeedbackType::General,
            FeedbackKind::Bug => FeedbackType::Bug,
            FeedbackKind::Suggestion => FeedbackType::Suggestion,
            FeedbackKind::Praise => FeedbackType::Praise,
        }
    }
}

#[derive(Args, Debug)]
pub struct FeedbackArgs {
    #[arg(long = "type", value_enum, default_value = "general")]
    pub kind: FeedbackKind,

    #[arg(long)]
    pub subject: String,

    #[arg(long)]
    pub message: String,

    /// Reply address, for anonymous feedback.
    #[arg(long)]
    pub email: Option<String>,

    /// 1 to 5.
    #[arg(long)]
    pub rating: Option<u8>,
}

impl FeedbackArgs {
    pub fn form(&self) -> FeedbackForm {
        FeedbackForm {
            feedback_type: self.kind.into(),
            subject: self.subject.clone(),
            message: self.message.clone(),
            email: self.email.clone(),
            rating: self.rating,
        }
    }
}

pub async fn run_feedback(ctx: &Context, args: &FeedbackArgs) -> Result<u8> {
    let stored = ctx.client.feedback().submit(&args.form()).await?;
    emit(ctx.json, &stored, |_| vec!["Thank you for your feedback".to_string()])?;
    Ok(0)
}
