//! `chatflow report summary|conversation`: write text reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use chrono::Local;

use chatflow_core::ContactId;
use chatflow_report::{Report, ReportGenerator};

use super::Session;

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    /// General report: overview, status distribution, sales and performance.
    Summary(OutputArgs),

    /// Contact details and full transcript for one contact.
    Conversation {
        /// Contact id (e.g. "c1").
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args, Debug)]
pub struct OutputArgs {
    /// File or directory to write to. Defaults to `report_dir` from
    /// ~/.chatflow/config.yaml, else the current directory.
    #[arg(long, short = 'o', conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// Print the report instead of writing a file.
    #[arg(long)]
    pub stdout: bool,
}

pub fn run(cmd: ReportCommand, session: &Session) -> Result<()> {
    let template_dir = session.settings.template_dir_at(&session.home);
    let generator = ReportGenerator::with_templates(&template_dir).with_context(|| {
        format!("failed to load report templates from {}", template_dir.display())
    })?;
    let now = Local::now();

    match cmd {
        ReportCommand::Summary(output) => {
            let report = generator
                .summary(&session.crm, now)
                .context("failed to render summary report")?;
            emit(report, &output, session)
        }
        ReportCommand::Conversation { id, output } => {
            let id = ContactId::from(id);
            let report = generator
                .conversation(&session.crm, &id, now)
                .with_context(|| format!("failed to render conversation report for '{id}'"))?;
            emit(report, &output, session)
        }
    }
}

fn emit(report: Report, args: &OutputArgs, session: &Session) -> Result<()> {
    if args.stdout {
        print!("{}", report.content);
        return Ok(());
    }

    let path = target_path(&report.file_name, args.output.as_deref(), session)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    std::fs::write(&path, &report.content)
        .with_context(|| format!("cannot write {}", path.display()))?;
    println!("✓ Wrote {}", path.display());
    Ok(())
}

fn target_path(file_name: &str, output: Option<&Path>, session: &Session) -> Result<PathBuf> {
    match output {
        Some(path) if path.is_dir() => Ok(path.join(file_name)),
        Some(path) => Ok(path.to_path_buf()),
        None => {
            let dir = match &session.settings.report_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir().context("cannot determine current directory")?,
            };
            Ok(dir.join(file_name))
        }
    }
}
