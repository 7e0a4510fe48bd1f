use chrono::{DateTime, TimeZone};
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, html};
use serde_json::Value;
use tracing::debug;

use crate::error::AppError;
use crate::models::{OutputStyle, UserIntent};

pub const EXPORT_MIME_TYPE: &str = "text/markdown";

/// How the extraction result is shown on the page
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBody {
    /// Markdown converted to HTML
    Markdown(String),
    /// Result parsed as JSON
    Structured(Value),
    /// Shown as-is in a code block
    Literal(String),
}

/// Downloadable copy of the result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presentation {
    pub body: RenderedBody,
    pub export: ExportArtifact,
}

pub fn present<Tz: TimeZone>(result: &str, intent: &UserIntent, now: DateTime<Tz>) -> Presentation
where
    Tz::Offset: std::fmt::Display,
{
    let body = match intent.style {
        OutputStyle::Json => match parse_structured(result) {
            Ok(value) => RenderedBody::Structured(value),
            Err(e) => {
                debug!(error = %e, "Falling back to literal display");
                RenderedBody::Literal(result.to_string())
            }
        },
        _ => RenderedBody::Markdown(markdown_to_html(result)),
    };

    Presentation {
        body,
        export: ExportArtifact {
            file_name: export_file_name(now),
            mime_type: EXPORT_MIME_TYPE,
            body: result.to_string(),
        },
    }
}

pub fn parse_structured(result: &str) -> Result<Value, AppError> {
    Ok(serde_json::from_str(result)?)
}

/// `extracted_YYYYMMDD_HHMMSS.md`
pub fn export_file_name<Tz: TimeZone>(now: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("extracted_{}.md", now.format("%Y%m%d_%H%M%S"))
}

/// Render Markdown with tables enabled.
///
/// Raw HTML in the input is escaped, not passed through. Link targets outside http, https
/// and mailto are replaced with `#`, and images become plain links so nothing is fetched.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::Html(raw) => Event::Text(raw),
        Event::Start(Tag::Link(kind, dest, title)) | Event::Start(Tag::Image(kind, dest, title)) => {
            Event::Start(Tag::Link(kind, safe_link_target(dest), title))
        }
        Event::End(Tag::Link(kind, dest, title)) | Event::End(Tag::Image(kind, dest, title)) => {
            Event::End(Tag::Link(kind, dest, title))
        }
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 2);
    html::push_html(&mut out, parser);
    out
}

const ALLOWED_LINK_SCHEMES: [&str; 3] = ["http://", "https://", "mailto:"];

fn safe_link_target(dest: CowStr<'_>) -> CowStr<'_> {
    let target = dest.trim().to_ascii_lowercase();
    let allowed = target.starts_with('#')
        || ALLOWED_LINK_SCHEMES
            .iter()
            .any(|scheme| target.starts_with(scheme));
    if allowed {
        dest
    } else {
        debug!(link = &*dest, "Dropping unsafe link target");
        CowStr::Borrowed("#")
    }
}
