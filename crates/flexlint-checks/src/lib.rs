//! # flexlint-checks
//!
//! Built-in checks for flexlint.
//!
//! ## Available Rules
//!
//! | Code | Name | Description |
//! |------|------|-------------|
//! | S1467 | `constructor-calls-dispatch-event` | Forbids event dispatch from class constructors |
//! | S1314 | `octal-value` | Forbids octal numeric literals |
//!
//! ## Usage
//!
//! ```ignore
//! use flexlint_core::Analyzer;
//! use flexlint_checks::{ConstructorCallsDispatchEvent, OctalValue};
//!
//! let analyzer = Analyzer::builder()
//!     .root("./build/ast")
//!     .check(ConstructorCallsDispatchEvent::new())
//!     .check(OctalValue::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod constructor_calls_dispatch_event;
pub mod octal_value;
mod presets;

#[cfg(test)]
mod fixtures;

pub use constructor_calls_dispatch_event::ConstructorCallsDispatchEvent;
pub use octal_value::OctalValue;
pub use presets::{all_rules, rules_for_config, sonar_way_rules, Preset};

/// Re-export core types for convenience.
pub use flexlint_core::{Check, Severity, Violation};
