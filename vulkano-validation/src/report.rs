// Copyright (c) 2016 The vulkano developers
// Licensed under the Apache License, Version 2.0
// <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT
// license <LICENSE-MIT or https://opensource.org/licenses/MIT>,
// at your option. All files in the project carrying such
// notice may not be copied, modified, or distributed except
// according to those terms.

//! Collection of validation errors produced by one call.

use crate::ValidationError;
use std::{
    borrow::Cow,
    error::Error,
    fmt::{Debug, Display, Error as FmtError, Formatter},
};

/// A stable identifier of one validation rule. These are the Vulkan *Valid Usage IDs* (VUIDs), or
/// for hazards that have no VUID, the identifiers the Khronos validation layers use.
pub type RuleId = &'static str;

/// The class of a validation error.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input is malformed: a list has the wrong length, a required value is missing or a
    /// handle does not refer to a live object.
    Structural,

    /// The input needs a feature, extension or API version that is not enabled. The same input may
    /// become valid if the capabilities change.
    Capability,

    /// Two parts of the input, or the input and an existing object, contradict each other.
    #[default]
    Consistency,

    /// An object is destroyed, freed or reset while a command sequence still references it.
    ResourceInUse,

    /// A command sequence references an object that has been destroyed.
    DanglingReference,

    /// A descriptor pool does not have enough capacity left for an allocation.
    PoolExhausted,
}

/// Whether validation stops at the first violated rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValidationMode {
    /// Stop at the first violation. The report contains exactly one error on failure.
    #[default]
    FailFast,

    /// Evaluate every rule that does not depend on the outcome of an earlier rule, and report all
    /// violations.
    CollectAll,
}

/// The errors produced by one validation call.
///
/// A report is only ever returned when it contains at least one error.
pub struct ValidationReport {
    mode: ValidationMode,
    errors: Vec<Box<ValidationError>>,
    context: Vec<Cow<'static, str>>,
}

/// Returned by rule bodies when a fail-fast report has received its error.
#[derive(Debug)]
pub(crate) struct Halt;

impl ValidationReport {
    /// Creates an empty report.
    #[inline]
    pub fn new(mode: ValidationMode) -> Self {
        ValidationReport {
            mode,
            errors: Vec::new(),
            context: Vec::new(),
        }
    }

    /// Runs `rules` against a fresh report, and returns the report if any rule was violated.
    #[inline]
    pub(crate) fn run(
        mode: ValidationMode,
        rules: impl FnOnce(&mut ValidationReport) -> Result<(), Halt>,
    ) -> Result<(), ValidationReport> {
        Self::evaluate(mode, rules)
    }

    /// Like `run`, but also returns what `rules` produced when nothing was violated.
    pub(crate) fn evaluate<T>(
        mode: ValidationMode,
        rules: impl FnOnce(&mut ValidationReport) -> Result<T, Halt>,
    ) -> Result<T, ValidationReport> {
        let mut report = ValidationReport::new(mode);

        match rules(&mut report) {
            Ok(value) if report.errors.is_empty() => Ok(value),
            _ => Err(report),
        }
    }

    /// Returns the mode the report was created with.
    #[inline]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Returns the errors in the order they were found.
    #[inline]
    pub fn errors(&self) -> &[Box<ValidationError>] {
        &self.errors
    }

    /// Returns the errors in the order they were found.
    #[inline]
    pub fn into_errors(self) -> Vec<Box<ValidationError>> {
        self.errors
    }

    /// Returns the number of errors.
    #[inline]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns whether the report holds no errors.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the first error that was found.
    #[inline]
    pub fn first(&self) -> Option<&ValidationError> {
        self.errors.first().map(AsRef::as_ref)
    }

    /// Returns every rule ID mentioned by any of the errors.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.errors.iter().flat_map(|error| error.vuids.iter().copied())
    }

    /// Returns whether any error was reported for the given rule ID.
    pub fn contains(&self, rule_id: &str) -> bool {
        self.rule_ids().any(|id| id == rule_id)
    }

    /// Returns how many errors were reported for the given rule ID.
    pub fn count(&self, rule_id: &str) -> usize {
        self.errors
            .iter()
            .filter(|error| error.vuids.iter().any(|&id| id == rule_id))
            .count()
    }

    /// Returns the kind of every error, in order.
    pub fn kinds(&self) -> impl Iterator<Item = ErrorKind> + '_ {
        self.errors.iter().map(|error| error.kind())
    }

    pub(crate) fn push(&mut self, mut error: Box<ValidationError>) -> Result<(), Halt> {
        for context in self.context.iter().rev() {
            error = error.add_context(context.clone());
        }

        self.errors.push(error);

        match self.mode {
            ValidationMode::FailFast => Err(Halt),
            ValidationMode::CollectAll => Ok(()),
        }
    }

    pub(crate) fn check(&mut self, result: Result<(), Box<ValidationError>>) -> Result<(), Halt> {
        match result {
            Ok(()) => Ok(()),
            Err(error) => self.push(error),
        }
    }

    /// Evaluates `rules` with `context` prepended to every error they push.
    pub(crate) fn scope<R>(
        &mut self,
        context: impl Into<Cow<'static, str>>,
        rules: impl FnOnce(&mut Self) -> Result<R, Halt>,
    ) -> Result<R, Halt> {
        self.context.push(context.into());
        let result = rules(self);
        self.context.pop();

        result
    }

    /// Returns a marker that can be passed to `failed_since` later.
    #[inline]
    pub(crate) fn mark(&self) -> usize {
        self.errors.len()
    }

    /// Returns whether any error was pushed since `mark` was taken. Rules whose evaluation only
    /// makes sense on well-formed input use this to skip themselves.
    #[inline]
    pub(crate) fn failed_since(&self, mark: usize) -> bool {
        self.errors.len() > mark
    }
}

impl Debug for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        f.debug_list().entries(&self.errors).finish()
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), FmtError> {
        match self.errors.as_slice() {
            [] => write!(f, "no validation errors"),
            [error] => write!(f, "{}", error),
            errors => {
                write!(f, "{} validation errors:", errors.len())?;

                for error in errors {
                    write!(f, "\n    {}", error)?;
                }

                Ok(())
            }
        }
    }
}

impl Error for ValidationReport {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.errors
            .first()
            .map(|error| error.as_ref() as &(dyn Error + 'static))
    }
}

impl From<ValidationReport> for Vec<Box<ValidationError>> {
    #[inline]
    fn from(report: ValidationReport) -> Self {
        report.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(vuid: &'static [&'static str]) -> Box<ValidationError> {
        Box::new(ValidationError {
            problem: "is wrong".into(),
            vuids: vuid,
            ..Default::default()
        })
    }

    #[test]
    fn fail_fast_stops() {
        let result = ValidationReport::run(ValidationMode::FailFast, |report| {
            report.push(error(&["VUID-a"]))?;
            report.push(error(&["VUID-b"]))?;
            Ok(())
        });

        let report = result.unwrap_err();
        assert_eq!(report.len(), 1);
        assert!(report.contains("VUID-a"));
        assert!(!report.contains("VUID-b"));
    }

    #[test]
    fn collect_all_continues() {
        let result = ValidationReport::run(ValidationMode::CollectAll, |report| {
            report.push(error(&["VUID-a"]))?;
            report.push(error(&["VUID-b"]))?;
            Ok(())
        });

        let report = result.unwrap_err();
        assert_eq!(report.rule_ids().collect::<Vec<_>>(), ["VUID-a", "VUID-b"]);
        assert!(report.kinds().all(|kind| kind == ErrorKind::Consistency));
    }

    #[test]
    fn scoped_context() {
        let result = ValidationReport::run(ValidationMode::CollectAll, |report| {
            report.scope("create_info", |report| {
                report.scope("subpasses[1]", |report| report.push(error(&["VUID-a"])))
            })?;
            report.push(error(&["VUID-b"]))
        });

        let report = result.unwrap_err();
        assert_eq!(report.errors()[0].context, "create_info.subpasses[1]");
        assert_eq!(report.errors()[1].context, "");
    }

    #[test]
    fn empty_run_is_ok() {
        assert!(ValidationReport::run(ValidationMode::CollectAll, |_| Ok(())).is_ok());
    }
}
