use crate::core::form::StagedFile;

/// Edits to the task form.
#[derive(Debug, Clone)]
pub enum FormMessage {
    TitleChanged(String),
    DescriptionChanged(String),
    /// Local `YYYY-MM-DDTHH:MM`, or empty to clear.
    DueDateChanged(String),
    /// Selector value: a person id as text, or empty for nobody.
    PersonSelected(String),
    CompletedChanged(Option<bool>),
    /// Replaces the staged set.
    FilesSelected(Vec<StagedFile>),
    FilesCleared,
}

/// Something the user should be told about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Self::Info(s) | Self::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}
