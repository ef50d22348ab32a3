//! Single-register memory (MS, MR, M+, MC)

use crate::core::{format_number, parse_float_prefix};

/// Numeric memory register
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Memory {
    value: f64,
}

impl Memory {
    /// Creates an empty (zero) register
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Stores the leading number of `display`, or 0 if there is none
    pub fn store(&mut self, display: &str) {
        self.value = parse_float_prefix(display).unwrap_or(0.0);
    }

    /// Adds the leading number of `display`; non-numeric text leaves memory unchanged
    pub fn add(&mut self, display: &str) {
        if let Some(n) = parse_float_prefix(display) {
            self.value += n;
        }
    }

    /// Returns the stored value in display form
    #[must_use]
    pub fn recall(&self) -> String {
        format_number(self.value)
    }

    /// Resets the register to zero
    pub fn clear(&mut self) {
        self.value = 0.0;
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_store_and_recall() {
        let mut memory = Memory::new();
        memory.store("12.5");
        assert_eq!(memory.value(), 12.5);
        assert_eq!(memory.recall(), "12.5");
    }

    #[test]
    fn test_store_non_numeric_is_zero() {
        let mut memory = Memory::new();
        memory.store("42");
        memory.store("Error");
        assert_eq!(memory.value(), 0.0);
    }

    #[test]
    fn test_store_uses_leading_number() {
        let mut memory = Memory::new();
        memory.store("3+4");
        assert_eq!(memory.value(), 3.0);
    }

    #[test]
    fn test_add() {
        let mut memory = Memory::new();
        memory.store("2");
        memory.add("3");
        assert_eq!(memory.recall(), "5");
        memory.add("sin(");
        assert_eq!(memory.recall(), "5");
    }

    #[test]
    fn test_clear() {
        let mut memory = Memory::new();
        memory.store("9");
        memory.clear();
        assert_eq!(memory.recall(), "0");
    }
}
