//! Couche d'erreurs et sessions d'édition
//!
//! Chaque règle écrit ses anomalies dans une [`EditSession`] : ouverture, ajouts, commit.
//! Une session abandonnée (erreur ou drop sans commit) est annulée sans toucher aux
//! anomalies déjà validées par les règles précédentes.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::rules::RuleKind;
use crate::types::{Category, Crs, Fid, Finding, Level};
use crate::CheckError;

/// Type d'un champ attributaire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Int,
    String,
}

/// Champ attributaire de la couche d'erreurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// Schéma de la couche d'erreurs : attributs, géométrie ponctuelle, projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub fields: Vec<Field>,
    pub crs: Crs,
}

impl Schema {
    /// `fid:int, level:string, type:string, message:string`, points en EPSG:4326
    pub fn error_layer() -> Self {
        Self {
            fields: vec![
                Field {
                    name: "fid",
                    kind: FieldKind::Int,
                },
                Field {
                    name: "level",
                    kind: FieldKind::String,
                },
                Field {
                    name: "type",
                    kind: FieldKind::String,
                },
                Field {
                    name: "message",
                    kind: FieldKind::String,
                },
            ],
            crs: Crs::WGS84,
        }
    }

    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::error_layer()
    }
}

/// Résultat d'un contrôle : anomalies validées, dans l'ordre d'émission
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    name: String,
    schema: Schema,
    findings: Vec<Finding>,
}

impl ResultSet {
    pub fn new(name: impl Into<String>, schema: Schema, findings: Vec<Finding>) -> Self {
        Self {
            name: name.into(),
            schema,
            findings,
        }
    }

    /// Nom de la couche (`<couche>_error`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn crs(&self) -> Crs {
        self.schema.crs
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Finding> {
        self.findings.iter()
    }

    /// Anomalies d'une catégorie donnée
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Finding> + '_ {
        self.findings.iter().filter(move |f| f.category == category)
    }

    pub fn count_by_level(&self) -> BTreeMap<Level, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.level).or_insert(0) += 1;
        }
        counts
    }

    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for finding in &self.findings {
            *counts.entry(finding.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        self.findings.iter().any(|f| f.level == Level::Error)
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Finding;
    type IntoIter = std::slice::Iter<'a, Finding>;

    fn into_iter(self) -> Self::IntoIter {
        self.findings.iter()
    }
}

/// Destination des anomalies, éditée par transactions successives
pub trait ErrorSink {
    /// Réinitialise la couche pour un nouveau contrôle
    fn begin_run(&mut self, name: &str, schema: Schema);

    /// Ouvre une transaction d'édition
    fn start_editing(&mut self) -> Result<(), CheckError>;

    /// Ajoute une anomalie à la transaction ouverte
    fn add_finding(&mut self, finding: Finding);

    /// Valide la transaction ouverte et retourne le nombre d'anomalies ajoutées
    fn commit_changes(&mut self) -> Result<usize, CheckError>;

    /// Annule la transaction ouverte
    fn rollback(&mut self);

    /// Clôt le contrôle et livre la couche complète
    fn commit_run(&mut self) -> ResultSet;
}

/// Couche d'erreurs en mémoire
#[derive(Debug, Default)]
pub struct MemoryErrorLayer {
    name: String,
    schema: Schema,
    committed: Vec<Finding>,
    pending: Option<Vec<Finding>>,
}

impl MemoryErrorLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    /// Anomalies déjà validées
    pub fn committed(&self) -> &[Finding] {
        &self.committed
    }
}

impl ErrorSink for MemoryErrorLayer {
    fn begin_run(&mut self, name: &str, schema: Schema) {
        self.name = name.to_string();
        self.schema = schema;
        self.committed.clear();
        self.pending = None;
    }

    fn start_editing(&mut self) -> Result<(), CheckError> {
        if self.pending.is_some() {
            return Err(CheckError::EditSessionActive);
        }
        self.pending = Some(Vec::new());
        Ok(())
    }

    fn add_finding(&mut self, finding: Finding) {
        match self.pending.as_mut() {
            Some(pending) => pending.push(finding),
            None => warn!(fid = finding.fid, "Finding added outside of an edit session, ignored"),
        }
    }

    fn commit_changes(&mut self) -> Result<usize, CheckError> {
        let Some(pending) = self.pending.take() else {
            return Err(CheckError::NoEditSession);
        };
        let count = pending.len();
        self.committed.extend(pending);
        Ok(count)
    }

    fn rollback(&mut self) {
        self.pending = None;
    }

    fn commit_run(&mut self) -> ResultSet {
        self.pending = None;
        ResultSet::new(
            std::mem::take(&mut self.name),
            self.schema.clone(),
            std::mem::take(&mut self.committed),
        )
    }
}

/// Transaction d'édition d'une règle sur la couche d'erreurs
///
/// La session vérifie que chaque anomalie référence une feature examinée pendant la passe.
/// Si elle est droppée sans commit, la transaction est annulée.
pub struct EditSession<'s> {
    sink: &'s mut dyn ErrorSink,
    rule: RuleKind,
    examined: HashSet<Fid>,
    failure: Option<String>,
    open: bool,
}

impl<'s> EditSession<'s> {
    /// Ouvre une transaction pour la règle
    pub fn begin(sink: &'s mut dyn ErrorSink, rule: RuleKind) -> Result<Self, CheckError> {
        sink.start_editing()
            .map_err(|e| CheckError::transaction(rule, e.to_string()))?;

        debug!(rule = %rule, "Edit session opened");

        Ok(Self {
            sink,
            rule,
            examined: HashSet::new(),
            failure: None,
            open: true,
        })
    }

    /// Déclare une feature comme examinée dans cette passe
    pub fn examine(&mut self, fid: Fid) {
        self.examined.insert(fid);
    }

    /// Ajoute une anomalie ; une anomalie sur une feature non examinée fait échouer le commit
    pub fn add(&mut self, finding: Finding) {
        if !self.examined.contains(&finding.fid) {
            if self.failure.is_none() {
                self.failure = Some(format!(
                    "finding references fid {} which was not examined",
                    finding.fid
                ));
            }
            return;
        }

        debug!(
            rule = %self.rule,
            fid = finding.fid,
            level = %finding.level,
            message = %finding.message,
            "Finding"
        );
        self.sink.add_finding(finding);
    }

    /// Valide la transaction
    ///
    /// # Errors
    /// Retourne `CheckError::TransactionFailed` si la session est invalide ou si la couche
    /// refuse le commit ; la transaction est alors annulée.
    pub fn commit(mut self) -> Result<usize, CheckError> {
        self.open = false;

        if let Some(reason) = self.failure.take() {
            self.sink.rollback();
            warn!(rule = %self.rule, reason = %reason, "Edit session rolled back");
            return Err(CheckError::transaction(self.rule, reason));
        }

        match self.sink.commit_changes() {
            Ok(count) => {
                info!(
                    rule = %self.rule,
                    features = self.examined.len(),
                    findings = count,
                    "Rule committed"
                );
                Ok(count)
            }
            Err(e) => {
                self.sink.rollback();
                warn!(rule = %self.rule, error = %e, "Commit failed, edit session rolled back");
                Err(CheckError::transaction(self.rule, e.to_string()))
            }
        }
    }
}

impl Drop for EditSession<'_> {
    fn drop(&mut self) {
        if self.open {
            warn!(rule = %self.rule, "Edit session dropped without commit, rolling back");
            self.sink.rollback();
        }
    }
}
