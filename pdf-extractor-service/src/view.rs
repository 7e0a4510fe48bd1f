use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;

use crate::intent::IntentForm;
use crate::models::{OutputStyle, UserIntent};
use crate::present::{Presentation, RenderedBody};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// One piece of page output, in the order steps produced it
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Notice { kind: NoticeKind, text: String },
    FileInfo { name: String, size: usize },
    /// The intent form, optionally prefilled with a rejected submission
    IntentForm(Option<IntentForm>),
    IntentSummary(UserIntent),
    ExtractAction,
    Result(Presentation),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageView {
    pub blocks: Vec<Block>,
}

impl PageView {
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(Block::Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(Block::Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        });
    }

    pub fn has_error(&self) -> bool {
        self.blocks.iter().any(|block| {
            matches!(
                block,
                Block::Notice {
                    kind: NoticeKind::Error,
                    ..
                }
            )
        })
    }

    pub fn shows_intent_form(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, Block::IntentForm(_)))
    }

    pub fn result(&self) -> Option<&Presentation> {
        self.blocks.iter().find_map(|block| match block {
            Block::Result(presentation) => Some(presentation),
            _ => None,
        })
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 760px; margin: 2rem auto; padding: 0 1rem; color: #1c1917; }
.notice { padding: 0.75rem 1rem; border-radius: 8px; margin: 1rem 0; }
.notice.info { background: #eff6ff; color: #1e40af; }
.notice.success { background: #f0fdf4; color: #166534; }
.notice.error { background: #fef2f2; color: #991b1b; }
form { margin: 1rem 0; }
label { display: block; margin-top: 0.75rem; font-weight: 500; }
textarea, input[type=text], select { width: 100%; box-sizing: border-box; padding: 0.5rem; }
button { margin-top: 1rem; padding: 0.6rem 1rem; width: 100%; border-radius: 8px; border: 1px solid #d6d3d1; cursor: pointer; }
button.primary { background: #dc2626; color: white; border: none; }
details { border: 1px solid #e7e5e4; border-radius: 8px; padding: 0.5rem 1rem; margin: 1rem 0; }
table { border-collapse: collapse; }
th, td { border: 1px solid #d6d3d1; padding: 0.3rem 0.6rem; }
pre { background: #f5f5f4; padding: 0.75rem; overflow-x: auto; }
#spinner { display: none; }
"#;

pub fn render_page(view: &PageView) -> String {
    let mut body = String::new();
    for block in &view.blocks {
        render_block(&mut body, block);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Smart PDF Extractor</title>
  <style>{STYLE}</style>
</head>
<body>
  <h1>📄 Smart PDF Extractor</h1>
  <p>Upload a PDF and specify exactly what you want. This tool will extract and format the information for you.</p>
  <form method="post" action="/upload" enctype="multipart/form-data">
    <label for="file">Choose a PDF file</label>
    <input id="file" type="file" name="file" accept=".pdf,application/pdf" required>
    <button type="submit">Upload</button>
  </form>
{body}
</body>
</html>
"#
    )
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Notice { kind, text } => {
            let class = match kind {
                NoticeKind::Info => "info",
                NoticeKind::Error => "error",
            };
            let _ = writeln!(
                out,
                r#"<div class="notice {class}">{}</div>"#,
                encode_text(text)
            );
        }
        Block::FileInfo { name, size } => {
            let _ = writeln!(
                out,
                r#"<div class="notice success">📄 File uploaded: {} ({size} bytes)</div>"#,
                encode_text(name)
            );
        }
        Block::IntentForm(previous) => render_intent_form(out, previous.as_ref()),
        Block::IntentSummary(intent) => render_intent_summary(out, intent),
        Block::ExtractAction => {
            out.push_str(
                r#"<form method="post" action="/extract" onsubmit="document.getElementById('spinner').style.display='block'">
  <button class="primary" type="submit">🚀 Extract Information</button>
</form>
<div id="spinner" class="notice info">🔄 Analyzing PDF... This may take a few moments.</div>
"#,
            );
        }
        Block::Result(presentation) => render_result(out, presentation),
    }
}

fn render_intent_form(out: &mut String, previous: Option<&IntentForm>) {
    let empty = IntentForm::default();
    let form = previous.unwrap_or(&empty);
    let selected_style: OutputStyle = form.style.parse().unwrap_or_default();

    let mut options = String::new();
    for style in OutputStyle::ALL {
        let selected = if style == selected_style { " selected" } else { "" };
        let _ = write!(
            options,
            r#"<option value="{label}"{selected}>{label}</option>"#,
            label = style.label()
        );
    }

    let _ = writeln!(
        out,
        r#"<h3>🔍 Tell us what you need</h3>
<form method="post" action="/intent">
  <label for="goal">Describe the information you need in plain language</label>
  <textarea id="goal" name="goal" rows="3" placeholder="e.g. 'Find all financial figures and summarize them in a table'">{goal}</textarea>
  <label for="entities">Specific entities / fields to extract (comma-separated)</label>
  <input id="entities" type="text" name="entities" value="{entities}" placeholder="e.g. Invoice Number, Total Amount, Due Date, Customer Name">
  <label for="style">Preferred output style</label>
  <select id="style" name="style">{options}</select>
  <label for="notes">Any extra instructions or context?</label>
  <textarea id="notes" name="notes" rows="2" placeholder="e.g. Convert all currencies to USD, include page references">{notes}</textarea>
  <button type="submit">Confirm &amp; Continue</button>
</form>"#,
        goal = encode_text(&form.goal),
        entities = encode_double_quoted_attribute(&form.entities),
        notes = encode_text(&form.notes),
    );
}

fn render_intent_summary(out: &mut String, intent: &UserIntent) {
    let entities = if intent.entities.is_empty() {
        "None".to_string()
    } else {
        intent.entities.join(", ")
    };
    let notes = if intent.notes.is_empty() {
        "None"
    } else {
        intent.notes.as_str()
    };

    let _ = writeln!(
        out,
        r#"<details>
  <summary>Current Settings</summary>
  <p><strong>Goal:</strong> {}</p>
  <p><strong>Output Style:</strong> {}</p>
  <p><strong>Entities:</strong> {}</p>
  <p><strong>Notes:</strong> {}</p>
</details>"#,
        encode_text(&intent.goal),
        intent.style,
        encode_text(&entities),
        encode_text(notes),
    );
}

fn render_result(out: &mut String, presentation: &Presentation) {
    let body = match &presentation.body {
        RenderedBody::Markdown(html) => html.clone(),
        RenderedBody::Structured(value) => {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!(r#"<pre class="json">{}</pre>"#, encode_text(&pretty))
        }
        RenderedBody::Literal(text) => format!(
            r#"<pre><code class="language-json">{}</code></pre>"#,
            encode_text(text)
        ),
    };

    let _ = writeln!(
        out,
        r#"<div class="notice success">✅ Extraction complete!</div>
<hr>
<details open>
  <summary>📋 Extracted Information</summary>
  {body}
</details>
<form method="get" action="/export">
  <button type="submit">📥 Download as Markdown ({file_name})</button>
</form>
<form method="post" action="/reset">
  <button type="submit">🔄 Extract Another PDF</button>
</form>"#,
        file_name = encode_text(&presentation.export.file_name),
    );
}
