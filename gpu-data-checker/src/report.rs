//! Rapport de contrôle
//!
//! Bilan par règle (transaction validée ou annulée), décompte des anomalies par niveau et
//! par catégorie, affichage console et sauvegarde JSON.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use gpu_check::{CheckReport, Level, RuleOutcome};
use serde::Serialize;

/// Statut global du contrôle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckStatus {
    /// Aucune anomalie
    Clean,
    /// Uniquement des WARNING
    Warnings,
    /// Au moins une ERROR
    Errors,
    /// Au moins une règle annulée
    Incomplete,
}

/// Rapport complet d'un contrôle
#[derive(Debug, Clone, Serialize)]
pub struct CheckSummary {
    /// Couche contrôlée
    pub layer: String,
    /// Couche d'erreurs produite
    pub error_layer: String,
    pub features: usize,
    pub zoning_or_sector: bool,
    pub duration_secs: f64,
    pub status: CheckStatus,
    pub ticks: usize,
    pub rules: Vec<RuleOutcome>,
    pub by_level: BTreeMap<String, usize>,
    pub by_category: BTreeMap<String, usize>,
}

impl CheckSummary {
    pub fn new(
        report: &CheckReport,
        layer: &str,
        features: usize,
        zoning_or_sector: bool,
        duration: Duration,
    ) -> Self {
        let by_level: BTreeMap<String, usize> = report
            .layer
            .count_by_level()
            .into_iter()
            .map(|(level, count)| (level.to_string(), count))
            .collect();
        let by_category = report
            .layer
            .count_by_category()
            .into_iter()
            .map(|(category, count)| (category.to_string(), count))
            .collect();

        let status = if report.rolled_back().next().is_some() {
            CheckStatus::Incomplete
        } else if by_level.contains_key(Level::Error.as_str()) {
            CheckStatus::Errors
        } else if by_level.contains_key(Level::Warning.as_str()) {
            CheckStatus::Warnings
        } else {
            CheckStatus::Clean
        };

        Self {
            layer: layer.to_string(),
            error_layer: report.layer.name().to_string(),
            features,
            zoning_or_sector,
            duration_secs: duration.as_secs_f64(),
            status,
            ticks: report.ticks,
            rules: report.rules.clone(),
            by_level,
            by_category,
        }
    }

    pub fn total_findings(&self) -> usize {
        self.by_level.values().sum()
    }

    pub fn errors(&self) -> usize {
        self.by_level.get(Level::Error.as_str()).copied().unwrap_or(0)
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("CHECK REPORT - {}", self.layer);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!(
            "Features: {} ({} rules, {} ticks)",
            self.features,
            self.rules.len(),
            self.ticks
        );

        println!("\n--- RULES ---");
        for outcome in &self.rules {
            match &outcome.status {
                gpu_check::RuleStatus::Committed { findings } => {
                    println!("  {}: {} findings", outcome.rule, findings)
                }
                gpu_check::RuleStatus::RolledBack { reason } => {
                    println!("  {}: ROLLED BACK ({})", outcome.rule, reason)
                }
            }
        }

        if !self.by_category.is_empty() {
            println!("\n--- BY TYPE ---");
            for (category, count) in &self.by_category {
                println!("  {}: {}", category, count);
            }
        }

        if !self.by_level.is_empty() {
            println!("\n--- BY LEVEL ---");
            for (level, count) in &self.by_level {
                println!("  {}: {}", level, count);
            }
        }

        println!("\nError layer: {}", self.error_layer);
        println!("{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} findings ({} errors) on {} features -> {}",
            self.layer,
            self.total_findings(),
            self.errors(),
            self.features,
            self.error_layer
        )
    }
}
