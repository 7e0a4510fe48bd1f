use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{OutputStyle, UserIntent};
use crate::session::SessionState;

/// Raw intent form as posted by the browser
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IntentForm {
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub entities: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub notes: String,
}

impl IntentForm {
    /// Validate the form and turn it into an intent
    pub fn into_intent(self) -> Result<UserIntent, AppError> {
        let goal = self.goal.trim();
        if goal.is_empty() {
            return Err(AppError::Validation(
                "Please describe what information you need before proceeding.".to_string(),
            ));
        }

        let style = if self.style.trim().is_empty() {
            OutputStyle::default()
        } else {
            self.style.parse()?
        };

        Ok(UserIntent {
            goal: goal.to_string(),
            entities: split_entities(&self.entities),
            style,
            notes: self.notes.trim().to_string(),
        })
    }
}

/// Comma-separated entity list, trimmed, empty tokens dropped
pub fn split_entities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entity| !entity.is_empty())
        .map(str::to_string)
        .collect()
}

/// Outcome of one pass through the intent collector
#[derive(Debug)]
pub enum Collected {
    /// An intent is stored; the rest of the page can run
    Ready(UserIntent),
    /// The submission was invalid; show the error and the form again
    Rejected { form: IntentForm, error: AppError },
    /// Nothing submitted yet
    Pending,
}

/// Return the stored intent, or apply `submission` if there is none yet.
///
/// A rejected submission leaves the session untouched.
pub fn collect(session: &mut SessionState, submission: Option<IntentForm>) -> Collected {
    if let Some(intent) = session.intent() {
        if submission.is_some() {
            debug!("Intent already submitted, ignoring form post");
        }
        return Collected::Ready(intent.clone());
    }

    let Some(form) = submission else {
        return Collected::Pending;
    };

    match form.clone().into_intent() {
        Ok(intent) => {
            info!(
                style = %intent.style,
                entities = intent.entities.len(),
                "Intent submitted"
            );
            session.submit(intent.clone());
            Collected::Ready(intent)
        }
        Err(error) => Collected::Rejected { form, error },
    }
}
