//! Screen identifier enum.

use std::fmt;

/// Identifies each primary console screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    /// Operator sign-in form; shown until a session exists.
    #[default]
    Login,
    /// The product table plus the create/edit/delete modal.
    Products,
}

impl ScreenId {
    /// Short label for the status bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Login => "Sign in",
            Self::Products => "Products",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
