//! Record source boundary
//!
//! This module defines the loosely typed input shape for ledger rows and the
//! validation that turns it into a well-typed `FinancialRecord`. Field names
//! are accepted in English (camelCase or snake_case) and in the source-locale
//! transliteration.

mod adapter;
mod record;

pub use adapter::*;
pub use record::*;
