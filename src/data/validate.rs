use std::collections::HashSet;
use std::fmt;

use crate::data::boss::Boss;
use crate::data::item::Item;
use crate::data::special::SpecialAttack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationDiagnostic> {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == ValidationSeverity::Warning)
    }

    /// First error rendered as one line, for error messages.
    pub fn summary(&self) -> Option<String> {
        let first = self.errors().next()?;
        let count = self.errors().count();
        if count == 1 {
            Some(first.to_string())
        } else {
            Some(format!("{first} (and {} more)", count - 1))
        }
    }
}

pub fn validate_items(items: &[Item]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();

    if items.is_empty() {
        report.push(ValidationSeverity::Error, "items", "data set is empty");
    }

    for (index, item) in items.iter().enumerate() {
        let context = format!("items[{index}] id={}", item.id);
        if !seen_ids.insert(item.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate id {}", item.id),
            );
        }
        if item.name.as_deref().map_or(true, |name| name.trim().is_empty()) {
            report.push(ValidationSeverity::Warning, context.clone(), "missing name");
        }
        if let Some(stats) = &item.combat_stats {
            for (key, value) in &stats.attack_bonuses {
                if !value.is_finite() {
                    report.push(
                        ValidationSeverity::Error,
                        format!("{context}.attack_bonuses.{key}"),
                        "bonus is not a finite number",
                    );
                }
            }
        }
    }

    report
}

pub fn validate_bosses(bosses: &[Boss]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_ids = HashSet::new();

    for (index, boss) in bosses.iter().enumerate() {
        let context = format!("bosses[{index}] id={}", boss.id);
        if !seen_ids.insert(boss.id) {
            report.push(
                ValidationSeverity::Error,
                context.clone(),
                format!("duplicate id {}", boss.id),
            );
        }
        if boss.name.trim().is_empty() {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.name"),
                "missing non-empty 'name'",
            );
        }
    }

    report
}

pub fn validate_special_attacks(specs: &[SpecialAttack]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen_weapons = HashSet::new();

    for (index, spec) in specs.iter().enumerate() {
        let context = format!("special_attacks[{index}] weapon_id={}", spec.weapon_id);
        if !(0.0..=100.0).contains(&spec.energy_cost) {
            report.push(
                ValidationSeverity::Error,
                format!("{context}.energy_cost"),
                format!("must be between 0 and 100, got {}", spec.energy_cost),
            );
        }
        if !seen_weapons.insert(spec.weapon_id) {
            report.push(
                ValidationSeverity::Warning,
                context,
                "weapon has more than one special attack; the first one wins",
            );
        }
    }

    report
}
