//! Collaborators the machine asks before acting

/// Yes/no gate in front of destructive actions
pub trait Confirm {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

/// Free-text input that the machine validates as a number.
/// `None` means the user dismissed the prompt.
pub trait NumericPrompt {
    fn prompt(&mut self, message: &str) -> Option<String>;
}

impl<F> NumericPrompt for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn prompt(&mut self, message: &str) -> Option<String> {
        self(message)
    }
}
