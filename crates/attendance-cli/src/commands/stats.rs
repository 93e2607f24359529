//! Weekly statistics CLI command.

use chrono::NaiveDate;
use clap::Args;

use attendance_client::{Action, ClassSelector};
use attendance_core::config::ClientConfig;
use attendance_core::error::AppError;
use attendance_core::types::ClassId;

use crate::output::{self, OutputFormat};
use crate::render;

/// Arguments for the stats command
#[derive(Debug, Args)]
pub struct StatsArgs {
    /// First day of the week (YYYY-MM-DD)
    pub start_date: NaiveDate,
    /// Class ID (defaults to the first class unless --all-classes)
    #[arg(short, long)]
    pub class: Option<ClassId>,
    /// Every class (admin)
    #[arg(long)]
    pub all_classes: bool,
}

/// Execute the stats command
pub async fn execute(
    args: &StatsArgs,
    config: &ClientConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut app = super::open_session(config).await?;

    let target = super::target_class(args.class, args.all_classes, app.selection().classes());
    if target.is_some() {
        app.perform(Action::ChooseClass {
            selector: ClassSelector::Statistics,
            class_id: target,
        })
        .await?;
    }
    app.perform(Action::LoadStatistics {
        start_date: args.start_date,
        all_classes: args.all_classes,
    })
    .await?;

    output::print_rendered(&render::statistics(app.statistics(), format));
    Ok(())
}
