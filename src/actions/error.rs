//! Failures of a user-initiated run/compile action.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Run,
    Compile,
}

impl ActionKind {
    pub fn verb(self) -> &'static str {
        match self {
            ActionKind::Run => "run",
            ActionKind::Compile => "compile",
        }
    }
}

/// Every variant is handled at the action boundary and shown to the user as
/// one notification. The `Display` text is that notification.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("No DhrLang file is open!")]
    NoActiveDocument,

    #[error("Please open a .dhr file to {}!", .action.verb())]
    WrongExtension { path: PathBuf, action: ActionKind },

    #[error("DhrLang.jar not found. Set dhrlang.jarPath or place DhrLang.jar in your workspace.")]
    ToolchainUnresolved,

    #[error("Compilation failed: {0}")]
    InvocationFailure(String),

    #[error("Compilation Error: {0}")]
    ToolError(String),

    #[error("Could not save {}: {message}", .path.display())]
    SaveFailed { path: PathBuf, message: String },
}

pub type ActionResult<T> = Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_text() {
        assert_eq!(ActionError::NoActiveDocument.to_string(), "No DhrLang file is open!");
        assert_eq!(
            ActionError::WrongExtension {
                path: "a.txt".into(),
                action: ActionKind::Run
            }
            .to_string(),
            "Please open a .dhr file to run!"
        );
        assert_eq!(
            ActionError::WrongExtension {
                path: "a.txt".into(),
                action: ActionKind::Compile
            }
            .to_string(),
            "Please open a .dhr file to compile!"
        );
        assert_eq!(
            ActionError::ToolError("error: unexpected token".into()).to_string(),
            "Compilation Error: error: unexpected token"
        );
        assert_eq!(
            ActionError::InvocationFailure("spawn error".into()).to_string(),
            "Compilation failed: spawn error"
        );
        assert!(ActionError::ToolchainUnresolved.to_string().contains("dhrlang.jarPath"));
    }
}
