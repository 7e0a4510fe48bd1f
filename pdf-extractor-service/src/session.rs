use crate::models::{UploadedDocument, UserIntent};
use crate::present::ExportArtifact;

/// Intent lifecycle: unset until the form is submitted, back to unset on reset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IntentState {
    #[default]
    Unset,
    Submitted(UserIntent),
}

/// Everything one user's page remembers between requests
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub intent: IntentState,
    pub document: Option<UploadedDocument>,
    pub last_export: Option<ExportArtifact>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submit(&mut self, intent: UserIntent) {
        self.intent = IntentState::Submitted(intent);
    }

    pub fn reset(&mut self) {
        self.intent = IntentState::Unset;
    }

    /// Nothing worth keeping: no document, no intent, no export
    pub fn is_blank(&self) -> bool {
        self.intent == IntentState::Unset && self.document.is_none() && self.last_export.is_none()
    }

    pub fn intent(&self) -> Option<&UserIntent> {
        match &self.intent {
            IntentState::Submitted(intent) => Some(intent),
            IntentState::Unset => None,
        }
    }
}
