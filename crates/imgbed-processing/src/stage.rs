use imgbed_core::SourceFile;

use crate::error::ProcessingError;

/// What a processing stage did with its input.
#[derive(Debug)]
pub enum StageOutcome {
    /// Preconditions not met; the input is handed back untouched.
    Skipped(SourceFile),
    Transformed(SourceFile),
    /// The stage failed and the input is handed back untouched.
    Recovered {
        file: SourceFile,
        error: ProcessingError,
    },
}

impl StageOutcome {
    pub fn into_file(self) -> SourceFile {
        match self {
            StageOutcome::Skipped(file) | StageOutcome::Transformed(file) => file,
            StageOutcome::Recovered { file, .. } => file,
        }
    }

    pub fn is_transformed(&self) -> bool {
        matches!(self, StageOutcome::Transformed(_))
    }

    pub fn error(&self) -> Option<&ProcessingError> {
        match self {
            StageOutcome::Recovered { error, .. } => Some(error),
            _ => None,
        }
    }
}
