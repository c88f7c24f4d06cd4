//! Tera rendering engine: [`ReportKind`], [`TemplateEngine`] and [`ReportGenerator`].
//!
//! | Report       | Template                  | File name                                  |
//! |--------------|---------------------------|--------------------------------------------|
//! | Summary      | `summary.txt.tera`        | `chatflow-report-<date>.txt`               |
//! | Conversation | `conversation.txt.tera`   | `conversation-<contact-slug>-<date>.txt`   |

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tera::Tera;

use chatflow_core::{ContactId, Crm};

use crate::context::{ConversationContext, SummaryContext};
use crate::error::{io_err, ReportError};
use crate::filters;

// ---------------------------------------------------------------------------
// Embedded templates, baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    ("shared/_footer.tera", include_str!("templates/_partials/footer.tera")),
    ("summary.txt.tera", include_str!("templates/summary.txt.tera")),
    ("conversation.txt.tera", include_str!("templates/conversation.txt.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn normalize_template_name(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").to_lowercase()
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), ReportError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

fn load_user_templates(dir: &Path) -> Result<Vec<(String, String)>, ReportError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut files = Vec::new();
    collect_template_files(dir, &mut files)?;
    let mut templates = Vec::new();
    for path in files {
        if path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let rel = path.strip_prefix(dir).unwrap_or(path.as_path());
        let name = normalize_template_name(rel);
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        tracing::debug!(template = %name, path = %path.display(), "user template override");
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(user_template_dir: Option<&Path>) -> Result<Tera, ReportError> {
    let mut templates: HashMap<String, String> = HashMap::new();
    for (name, content) in TPLS {
        templates.insert(normalize_template_name(Path::new(name)), (*content).to_string());
    }
    if let Some(dir) = user_template_dir {
        for (name, content) in load_user_templates(dir)? {
            templates.insert(name, content);
        }
    }

    let mut tera = Tera::default();
    filters::register(&mut tera);
    let items: Vec<(String, String)> = templates.into_iter().collect();
    tera.add_raw_templates(items)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// ReportKind
// ---------------------------------------------------------------------------

/// Every report the generator can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    Summary,
    Conversation,
}

impl ReportKind {
    pub fn all() -> &'static [ReportKind] {
        &[ReportKind::Summary, ReportKind::Conversation]
    }

    pub fn template_name(&self) -> &'static str {
        match self {
            ReportKind::Summary => "summary.txt.tera",
            ReportKind::Conversation => "conversation.txt.tera",
        }
    }
}

/// Rendered report ready to be written or printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub kind: ReportKind,
    pub file_name: String,
    pub content: String,
}

/// `chatflow-report-2026-02-11.txt`
pub fn summary_file_name(iso_date: &str) -> String {
    format!("chatflow-report-{iso_date}.txt")
}

/// `conversation-maria-lopez-2026-02-11.txt`
///
/// The slug keeps only alphanumerics and `-`, so a contact name can never
/// contribute a path separator or `..` component.
pub fn conversation_file_name(contact_name: &str, iso_date: &str) -> String {
    let words: Vec<String> = contact_name
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '-')
                .collect::<String>()
                .to_lowercase()
        })
        .filter(|word| !word.is_empty())
        .collect();
    let slug = if words.is_empty() { "contact".to_string() } else { words.join("-") };
    format!("conversation-{slug}-{iso_date}.txt")
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera engine with embedded templates and optional user overrides.
///
/// `user_template_dir` may contain `.tera` files that replace embedded
/// defaults of the same relative name (`summary.txt.tera`,
/// `shared/_footer.tera`, …).
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(user_template_dir: Option<&Path>) -> Result<Self, ReportError> {
        let tera = build_tera(user_template_dir)?;
        Ok(TemplateEngine { tera })
    }

    pub fn render_summary(&self, ctx: &SummaryContext) -> Result<String, ReportError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(ReportKind::Summary.template_name(), &tera_ctx)?)
    }

    pub fn render_conversation(&self, ctx: &ConversationContext) -> Result<String, ReportError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render(ReportKind::Conversation.template_name(), &tera_ctx)?)
    }
}

// ---------------------------------------------------------------------------
// ReportGenerator
// ---------------------------------------------------------------------------

/// Builds contexts from a [`Crm`] and renders them.
///
/// Create once and reuse; the generator only ever reads the CRM.
pub struct ReportGenerator {
    engine: TemplateEngine,
}

impl ReportGenerator {
    /// Embedded templates only.
    pub fn new() -> Result<Self, ReportError> {
        Ok(ReportGenerator { engine: TemplateEngine::new(None)? })
    }

    /// Embedded templates plus overrides from `dir`.
    pub fn with_templates(dir: &Path) -> Result<Self, ReportError> {
        Ok(ReportGenerator { engine: TemplateEngine::new(Some(dir))? })
    }

    pub fn summary(&self, crm: &Crm, generated_at: DateTime<Local>) -> Result<Report, ReportError> {
        let ctx = SummaryContext::from_crm(crm, generated_at);
        let content = self.engine.render_summary(&ctx)?;
        tracing::info!(bytes = content.len(), "summary report rendered");
        Ok(Report {
            kind: ReportKind::Summary,
            file_name: summary_file_name(&ctx.meta.iso_date),
            content,
        })
    }

    pub fn conversation(
        &self,
        crm: &Crm,
        contact: &ContactId,
        generated_at: DateTime<Local>,
    ) -> Result<Report, ReportError> {
        let ctx = ConversationContext::from_crm(crm, contact, generated_at)?;
        let content = self.engine.render_conversation(&ctx)?;
        tracing::info!(contact = %contact, messages = ctx.message_count, "conversation report rendered");
        Ok(Report {
            kind: ReportKind::Conversation,
            file_name: conversation_file_name(&ctx.contact.name, &ctx.meta.iso_date),
            content,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2026, 2, 11, 9, 5, 0)
            .single()
            .expect("unambiguous local time")
    }

    #[test]
    fn embedded_templates_compile() {
        let engine = TemplateEngine::new(None);
        assert!(engine.is_ok(), "embedded templates must parse: {:?}", engine.err().map(|e| e.to_string()));
    }

    #[test]
    fn file_names() {
        assert_eq!(summary_file_name("2026-02-11"), "chatflow-report-2026-02-11.txt");
        assert_eq!(
            conversation_file_name("Maria  Lopez", "2026-02-11"),
            "conversation-maria-lopez-2026-02-11.txt"
        );
    }

    #[test]
    fn conversation_file_name_drops_path_characters() {
        let name = conversation_file_name("a/../../../x", "2026-02-11");
        assert_eq!(name, "conversation-ax-2026-02-11.txt");
        assert!(!name.contains('/') && !name.contains(".."));

        assert_eq!(
            conversation_file_name(r"Jean-Luc O'Brien\ ..", "2026-02-11"),
            "conversation-jean-luc-obrien-2026-02-11.txt"
        );
        assert_eq!(
            conversation_file_name(" / .. ", "2026-02-11"),
            "conversation-contact-2026-02-11.txt"
        );
    }

    #[test]
    fn summary_report_has_every_section() {
        let crm = Crm::bundled().expect("bundled");
        let report = ReportGenerator::new().expect("generator").summary(&crm, at()).expect("render");
        assert_eq!(report.kind, ReportKind::Summary);
        assert_eq!(report.file_name, "chatflow-report-2026-02-11.txt");
        for heading in [
            "GENERAL REPORT",
            "OVERVIEW",
            "STATUS DISTRIBUTION",
            "PRODUCTS SOLD",
            "SALES BY AGENT",
            "PERFORMANCE BY AGENT",
        ] {
            assert!(report.content.contains(heading), "missing section {heading}");
        }
    }

    #[test]
    fn report_kinds_have_distinct_templates() {
        let names: Vec<&str> = ReportKind::all().iter().map(|k| k.template_name()).collect();
        assert_eq!(names, vec!["summary.txt.tera", "conversation.txt.tera"]);
    }
}
