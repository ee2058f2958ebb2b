// Free-text scouting reports kept for the current session only.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportError {
    #[error("scouting report is empty")]
    Empty,
}

/// Reports written during this session, newest first. Nothing here is
/// persisted; dropping the notebook discards them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportNotebook {
    reports: Vec<String>,
}

impl ReportNotebook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trim and record a report. Blank text is rejected.
    pub fn submit(&mut self, text: &str) -> Result<(), ReportError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ReportError::Empty);
        }
        self.reports.insert(0, text.to_string());
        Ok(())
    }

    pub fn reports(&self) -> &[String] {
        &self.reports
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }
}
