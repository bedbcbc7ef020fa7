/// The three-way result of one top-level run.
///
/// Exactly one variant is produced per run. A program that never aborts and
/// hits no transport failure always lands in [`Outcome::Value`]; the abort
/// primitive travels here as [`Outcome::Disconnected`], never through the
/// error channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<E, V> {
    /// A transport-level failure ended the run.
    Error(E),
    /// The program aborted itself before completing.
    Disconnected,
    /// The program ran to completion.
    Value(V),
}

impl<E, V> Outcome<E, V> {
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        matches!(self, Outcome::Disconnected)
    }

    #[must_use]
    pub fn is_value(&self) -> bool {
        matches!(self, Outcome::Value(_))
    }

    /// The completed value, if the run produced one.
    #[must_use]
    pub fn value(self) -> Option<V> {
        match self {
            Outcome::Value(value) => Some(value),
            Outcome::Error(_) | Outcome::Disconnected => None,
        }
    }

    /// The transport failure, if one ended the run.
    #[must_use]
    pub fn error(self) -> Option<E> {
        match self {
            Outcome::Error(error) => Some(error),
            Outcome::Disconnected | Outcome::Value(_) => None,
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Outcome<E, U> {
        match self {
            Outcome::Value(value) => Outcome::Value(f(value)),
            Outcome::Error(error) => Outcome::Error(error),
            Outcome::Disconnected => Outcome::Disconnected,
        }
    }

    #[must_use]
    pub fn map_error<F>(self, f: impl FnOnce(E) -> F) -> Outcome<F, V> {
        match self {
            Outcome::Value(value) => Outcome::Value(value),
            Outcome::Error(error) => Outcome::Error(f(error)),
            Outcome::Disconnected => Outcome::Disconnected,
        }
    }
}
