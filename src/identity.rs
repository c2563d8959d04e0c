// 🪪 Identity Value Objects - DNI, Email, PhoneNumber, Experience
// Normalization happens once at construction; values are compared as-is afterwards

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// DNI
// ============================================================================

/// Documento Nacional de Identidad.
///
/// No format validation beyond trimming: malformed documents simply never
/// match anything in the CRM.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dni(String);

impl Dni {
    pub fn new(raw: &str) -> Self {
        Dni(raw.trim().to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Dni {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// EMAIL
// ============================================================================

/// Email address, stored exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> Self {
        Email(raw.to_string())
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// PHONE NUMBER
// ============================================================================

/// Peruvian mobile number, normalized at construction.
///
/// Normalization rule:
/// - inputs shorter than 9 characters collapse to ""
/// - otherwise the shortest prefix ending at the first '9' is replaced by a
///   single '9' (country codes and leading zeros disappear, the rest is kept)
/// - no '9' anywhere collapses to ""
///
/// Construction never fails: a malformed phone is an empty value that simply
/// yields no match downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(raw: &str) -> Self {
        PhoneNumber(Self::normalize(raw))
    }

    fn normalize(raw: &str) -> String {
        if raw.chars().count() < 9 {
            return String::new();
        }
        match raw.find('9') {
            // '9' is ASCII, so idx + 1 is always a char boundary
            Some(idx) => format!("9{}", &raw[idx + 1..]),
            None => String::new(),
        }
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// A usable mobile number: exactly nine characters, leading '9'.
    pub fn is_valid(&self) -> bool {
        self.0.chars().count() == 9 && self.0.starts_with('9')
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// EXPERIENCE
// ============================================================================

/// Years of work experience. Non-negative, floored to whole years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Experience(u32);

impl Experience {
    pub fn new(years: f64) -> Result<Self> {
        if years < 0.0 {
            bail!("experience years cannot be negative: {}", years);
        }
        Ok(Experience(years.floor() as u32))
    }

    pub fn years(&self) -> u32 {
        self.0
    }

    pub fn meets_minimum(&self, minimum: u32) -> bool {
        self.0 >= minimum
    }
}

impl fmt::Display for Experience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} años", self.0)
    }
}

// ============================================================================
// TESTS
// ============================================================================
