/// Result of a step that never fails outright but may fall back locally.
///
/// `warnings` holds one message per fallback taken; an empty list means the
/// step completed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

impl<T> Outcome<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn degraded(value: T, warnings: Vec<String>) -> Self {
        Self { value, warnings }
    }

    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Splits into the value, appending this step's warnings to `sink`.
    pub fn into_value(self, sink: &mut Vec<String>) -> T {
        sink.extend(self.warnings);
        self.value
    }
}
