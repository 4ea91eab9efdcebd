//! Validation of submitted claims.
//!
//! Identity fields must match exactly. Entries must match pairwise in amount;
//! a submitted timelock may be early by up to the tolerance window but never
//! late.

use claimcheck_core::{
    AuditConfig, AuditError, AuditResult, ClaimEntry, Project, ReferenceClaim, SubmittedClaim,
};
use serde::{Deserialize, Serialize};

/// Result of validating one claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether validation passed
    pub passed: bool,
    /// Number of entries in the reference
    pub entry_count: usize,
    /// Entries accepted only thanks to the tolerance window
    pub skewed_entries: usize,
    /// Validation checks performed
    pub checks: Vec<ValidationCheck>,
}

impl ValidationReport {
    /// Create a new validation report
    #[must_use]
    pub fn new(passed: bool, entry_count: usize) -> Self {
        Self {
            passed,
            entry_count,
            skewed_entries: 0,
            checks: Vec::new(),
        }
    }

    /// Add a validation check
    #[must_use]
    pub fn with_check(mut self, check: ValidationCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Get failed checks
    #[must_use]
    pub fn failed_checks(&self) -> Vec<&ValidationCheck> {
        self.checks.iter().filter(|c| !c.passed).collect()
    }

    /// Get summary
    #[must_use]
    pub fn summary(&self) -> String {
        let passed_count = self.checks.iter().filter(|c| c.passed).count();
        format!(
            "Validation {}: {}/{} checks passed, {} entries, {} within tolerance",
            if self.passed { "PASSED" } else { "FAILED" },
            passed_count,
            self.checks.len(),
            self.entry_count,
            self.skewed_entries
        )
    }
}

/// A single validation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationCheck {
    /// Check name
    pub name: String,
    /// Whether check passed
    pub passed: bool,
    /// Check message
    pub message: String,
}

impl ValidationCheck {
    /// Create a passed check
    #[must_use]
    pub fn passed(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message,
        }
    }

    /// Create a failed check
    #[must_use]
    pub fn failed(name: &str, reason: String) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: reason,
        }
    }
}

/// Verdict on a submitted claim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    /// Per-check report
    pub report: ValidationReport,
    /// Failures in check order
    pub failures: Vec<AuditError>,
    /// Submission with timelocks snapped to the reference; only on acceptance
    pub corrected: Option<SubmittedClaim>,
}

impl ValidationOutcome {
    /// Whether the claim was accepted
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.report.passed
    }

    /// Corrected claim on acceptance, first failure otherwise
    ///
    /// # Errors
    ///
    /// Returns `StructuralMismatch` or `AddressSetMismatch` for a rejection
    pub fn into_result(self) -> AuditResult<SubmittedClaim> {
        match (self.corrected, self.failures.into_iter().next()) {
            (Some(corrected), None) => Ok(corrected),
            (_, Some(failure)) => Err(failure),
            (None, None) => Err(AuditError::AddressSetMismatch {
                index: None,
                reason: "no corrected claim produced".to_string(),
            }),
        }
    }
}

/// How a submitted timelock relates to its reference
enum TimelockFit {
    Exact,
    Early,
    TooEarly(u64),
    Late(u64),
}

/// Compares submitted claims with recomputed references
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimValidator {
    tolerance_seconds: u64,
}

impl ClaimValidator {
    /// Create a validator accepting timelocks up to `tolerance_seconds` early
    #[must_use]
    pub const fn new(tolerance_seconds: u64) -> Self {
        Self { tolerance_seconds }
    }

    /// Create a validator from the audit config
    #[must_use]
    pub const fn from_config(config: &AuditConfig) -> Self {
        Self::new(config.tolerance_seconds)
    }

    /// Tolerance window in seconds
    #[must_use]
    pub const fn tolerance_seconds(&self) -> u64 {
        self.tolerance_seconds
    }

    /// Validate `submitted` against `reference`
    #[must_use]
    pub fn validate(&self, reference: &ReferenceClaim, submitted: &SubmittedClaim) -> ValidationOutcome {
        let expected = reference.project();
        let actual = submitted.project();

        let mut report = ValidationReport::new(true, expected.entries.len());
        let mut failures = Vec::new();

        let same = |want: &str, got: &str| (want == got, want.to_string(), got.to_string());
        let identity = [
            ("email_address", same(expected.email_address, actual.email_address)),
            ("name", same(expected.name, actual.name)),
            ("source", same(expected.source, actual.source)),
            // Value equality ignores object key order
            (
                "signature",
                (
                    expected.signature == actual.signature,
                    expected.signature.to_string(),
                    actual.signature.to_string(),
                ),
            ),
        ];
        for (field, (matches, want, got)) in identity {
            if matches {
                report = report.with_check(ValidationCheck::passed(field, "matches".to_string()));
            } else {
                report = report.with_check(ValidationCheck::failed(
                    field,
                    format!("expected {}, got {}", want, got),
                ));
                failures.push(AuditError::StructuralMismatch {
                    field: field.to_string(),
                    expected: want,
                    actual: got,
                });
            }
        }

        if expected.entries.len() == actual.entries.len() {
            report = report.with_check(ValidationCheck::passed(
                "address_count",
                format!("{} entries", expected.entries.len()),
            ));
            let (amounts, amount_failure) = Self::check_amounts(&expected.entries, &actual.entries);
            report = report.with_check(amounts);
            failures.extend(amount_failure);

            let (timelocks, timelock_failure, skewed) =
                self.check_timelocks(&expected.entries, &actual.entries);
            report = report.with_check(timelocks);
            report.skewed_entries = skewed;
            failures.extend(timelock_failure);
        } else {
            let reason = format!(
                "expected {} entries, got {}",
                expected.entries.len(),
                actual.entries.len()
            );
            report = report.with_check(ValidationCheck::failed("address_count", reason.clone()));
            failures.push(AuditError::AddressSetMismatch { index: None, reason });
        }

        for check in &report.checks {
            tracing::debug!(check = %check.name, passed = check.passed, message = %check.message);
        }

        report.passed = report.checks.iter().all(|c| c.passed);

        let corrected = if report.passed {
            let timelocks: Vec<u64> = expected.entries.iter().map(|e| e.timelock).collect();
            match submitted.with_timelocks(&timelocks) {
                Ok(corrected) => Some(corrected),
                Err(err) => {
                    report.passed = false;
                    failures.push(err);
                    None
                }
            }
        } else {
            None
        };

        if report.passed {
            tracing::info!(
                email_address = %submitted.email_address,
                source = %submitted.source,
                skewed = report.skewed_entries,
                "claim accepted"
            );
        } else {
            tracing::warn!(
                email_address = %submitted.email_address,
                source = %submitted.source,
                summary = %report.summary(),
                "claim rejected"
            );
        }

        ValidationOutcome {
            report,
            failures,
            corrected,
        }
    }

    fn check_amounts(
        expected: &[ClaimEntry],
        actual: &[ClaimEntry],
    ) -> (ValidationCheck, Option<AuditError>) {
        let mismatch = expected
            .iter()
            .zip(actual)
            .position(|(want, got)| want.amount != got.amount);

        match mismatch {
            None => (
                ValidationCheck::passed("address_amounts", "all amounts match".to_string()),
                None,
            ),
            Some(index) => {
                let reason = format!(
                    "amount expected {}, got {}",
                    expected[index].amount, actual[index].amount
                );
                (
                    ValidationCheck::failed("address_amounts", format!("entry {}: {}", index, reason)),
                    Some(AuditError::AddressSetMismatch {
                        index: Some(index),
                        reason,
                    }),
                )
            }
        }
    }

    fn check_timelocks(
        &self,
        expected: &[ClaimEntry],
        actual: &[ClaimEntry],
    ) -> (ValidationCheck, Option<AuditError>, usize) {
        let mut skewed = 0;
        for (index, (want, got)) in expected.iter().zip(actual).enumerate() {
            let reason = match self.fit(want.timelock, got.timelock) {
                TimelockFit::Exact => continue,
                TimelockFit::Early => {
                    skewed += 1;
                    continue;
                }
                TimelockFit::TooEarly(by) => format!(
                    "timelock {} is {}s early, tolerance is {}s",
                    got.timelock, by, self.tolerance_seconds
                ),
                TimelockFit::Late(by) => {
                    format!("timelock {} is {}s late", got.timelock, by)
                }
            };
            return (
                ValidationCheck::failed("address_timelocks", format!("entry {}: {}", index, reason)),
                Some(AuditError::AddressSetMismatch {
                    index: Some(index),
                    reason,
                }),
                skewed,
            );
        }

        let message = if skewed == 0 {
            "all timelocks match".to_string()
        } else {
            format!("{} timelocks early within tolerance", skewed)
        };
        (ValidationCheck::passed("address_timelocks", message), None, skewed)
    }

    fn fit(&self, reference: u64, submitted: u64) -> TimelockFit {
        match reference.checked_sub(submitted) {
            Some(0) => TimelockFit::Exact,
            Some(early) if early <= self.tolerance_seconds => TimelockFit::Early,
            Some(early) => TimelockFit::TooEarly(early),
            None => TimelockFit::Late(submitted - reference),
        }
    }
}

impl Default for ClaimValidator {
    fn default() -> Self {
        Self::from_config(&AuditConfig::default())
    }
}
