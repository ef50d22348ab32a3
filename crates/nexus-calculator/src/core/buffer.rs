//! Display buffer
//!
//! Error prevention: the buffer can never be empty; every path that would
//! leave it empty falls back to `"0"`.

/// Text shown after a failed evaluation or calculation
pub const ERROR: &str = "Error";
/// Text shown when the graphed function cannot be compiled
pub const INVALID_GRAPH: &str = "Invalid function for graphing";
/// Text shown when the derivative cannot be taken
pub const INVALID_DERIVATIVE: &str = "Enter valid function with x";

/// Value of an empty display
pub const EMPTY: &str = "0";

/// Every sentinel the buffer may show in place of a value
pub const SENTINELS: [&str; 3] = [ERROR, INVALID_GRAPH, INVALID_DERIVATIVE];

/// The calculator display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBuffer {
    /// Creates a buffer showing `"0"`
    #[must_use]
    pub fn new() -> Self {
        Self {
            text: EMPTY.to_string(),
        }
    }

    /// Returns the displayed text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if the display shows `"0"` or a sentinel
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.text == EMPTY || self.is_sentinel()
    }

    /// Returns true if the display shows a sentinel
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        SENTINELS.contains(&self.text.as_str())
    }

    /// Appends a token, replacing `"0"` or a sentinel
    pub fn append(&mut self, token: &str) {
        if token.is_empty() {
            return;
        }
        if self.is_placeholder() {
            self.text.clear();
        }
        self.text.push_str(token);
    }

    /// Resets the display to `"0"`
    pub fn clear(&mut self) {
        self.text.clear();
        self.text.push_str(EMPTY);
    }

    /// Removes the last character
    pub fn delete_last(&mut self) {
        self.text.pop();
        if self.text.is_empty() {
            self.clear();
        }
    }

    /// Replaces the display; empty text shows `"0"`
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        if self.text.is_empty() {
            self.clear();
        }
    }
}

impl std::fmt::Display for InputBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== append tests =====

    #[test]
    fn test_new_buffer_shows_zero() {
        assert_eq!(InputBuffer::new().as_str(), "0");
        assert_eq!(InputBuffer::default().to_string(), "0");
    }

    #[test]
    fn test_append_replaces_zero() {
        let mut buffer = InputBuffer::new();
        buffer.append("7");
        assert_eq!(buffer.as_str(), "7");
        buffer.append("+");
        buffer.append("0");
        assert_eq!(buffer.as_str(), "7+0");
    }

    #[test]
    fn test_append_replaces_every_sentinel() {
        for sentinel in SENTINELS {
            let mut buffer = InputBuffer::new();
            buffer.set(sentinel);
            assert!(buffer.is_sentinel());
            buffer.append("sin(");
            assert_eq!(buffer.as_str(), "sin(");
        }
    }

    #[test]
    fn test_append_empty_token_keeps_content() {
        let mut buffer = InputBuffer::new();
        buffer.append("");
        assert_eq!(buffer.as_str(), "0");
    }

    // ===== delete / clear / set tests =====

    #[test]
    fn test_delete_last() {
        let mut buffer = InputBuffer::new();
        buffer.set("12");
        buffer.delete_last();
        assert_eq!(buffer.as_str(), "1");
        buffer.delete_last();
        assert_eq!(buffer.as_str(), "0");
        buffer.delete_last();
        assert_eq!(buffer.as_str(), "0");
    }

    #[test]
    fn test_delete_last_multibyte() {
        let mut buffer = InputBuffer::new();
        buffer.set("2π");
        buffer.delete_last();
        assert_eq!(buffer.as_str(), "2");
    }

    #[test]
    fn test_clear() {
        let mut buffer = InputBuffer::new();
        buffer.set("1+2");
        buffer.clear();
        assert_eq!(buffer.as_str(), "0");
    }

    #[test]
    fn test_set_empty_falls_back_to_zero() {
        let mut buffer = InputBuffer::new();
        buffer.set("");
        assert_eq!(buffer.as_str(), "0");
    }
}
