//! # chatflow-report
//!
//! Tera-based text reports rendered from a [`chatflow_core::Crm`] snapshot.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use chatflow_core::{ContactId, Crm};
//! use chatflow_report::ReportGenerator;
//!
//! fn export(crm: &Crm) {
//!     if let Ok(generator) = ReportGenerator::new() {
//!         let now = chrono::Local::now();
//!         if let Ok(report) = generator.summary(crm, now) {
//!             println!("{}: {} bytes", report.file_name, report.content.len());
//!         }
//!         if let Ok(report) = generator.conversation(crm, &ContactId::from("c1"), now) {
//!             println!("{}", report.content);
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod filters;

pub use context::{ConversationContext, SummaryContext};
pub use engine::{Report, ReportGenerator, ReportKind, TemplateEngine};
pub use error::ReportError;
