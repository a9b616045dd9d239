//! Orchestration d'un contrôle de couche
//!
//! Vérifie les préconditions, puis exécute les règles l'une après l'autre, chacune dans sa
//! propre session d'édition sur la couche d'erreurs.

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{info, warn};

use crate::config::CheckConfig;
use crate::measure::{Ellipsoid, EllipsoidalMeasure, LengthMeasure};
use crate::ops::{GeoOps, GeometryOps};
use crate::rules::{RuleContext, RuleKind};
use crate::sink::{EditSession, ErrorSink, MemoryErrorLayer, ResultSet, Schema};
use crate::types::{Crs, Feature};
use crate::CheckError;

/// Couche source parcourue par les règles
///
/// Chaque appel à [`FeatureSource::features`] doit fournir un nouveau parcours complet :
/// le flux est consommé une fois par règle.
pub trait FeatureSource {
    /// Nom de la couche
    fn name(&self) -> &str;

    fn crs(&self) -> Crs;

    /// Nombre total de features
    fn feature_count(&self) -> usize;

    fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_>;
}

/// Couche en mémoire
#[derive(Debug, Clone)]
pub struct MemoryLayer {
    name: String,
    crs: Crs,
    features: Vec<Feature>,
}

impl MemoryLayer {
    pub fn new(name: impl Into<String>, crs: Crs, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            crs,
            features,
        }
    }
}

impl FeatureSource for MemoryLayer {
    fn name(&self) -> &str {
        &self.name
    }

    fn crs(&self) -> Crs {
        self.crs
    }

    fn feature_count(&self) -> usize {
        self.features.len()
    }

    fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_> {
        Box::new(self.features.iter().cloned())
    }
}

/// Réception de l'avancement : un tick par feature et par règle exécutée
pub trait Progress {
    fn on_tick(&mut self, current: usize, total: usize);
}

impl<F: FnMut(usize, usize)> Progress for F {
    fn on_tick(&mut self, current: usize, total: usize) {
        self(current, total)
    }
}

/// Ignore l'avancement
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_tick(&mut self, _current: usize, _total: usize) {}
}

/// Issue de la transaction d'une règle
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RuleStatus {
    Committed { findings: usize },
    RolledBack { reason: String },
}

/// Bilan d'une règle exécutée
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutcome {
    pub rule: RuleKind,
    #[serde(flatten)]
    pub status: RuleStatus,
    /// Features examinées
    pub features: usize,
    #[serde(skip)]
    pub duration: Duration,
}

impl RuleOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self.status, RuleStatus::Committed { .. })
    }
}

/// Résultat complet d'un contrôle
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Couche d'erreurs assemblée
    pub layer: ResultSet,
    /// Règles exécutées, dans l'ordre
    pub rules: Vec<RuleOutcome>,
    /// Nombre de ticks émis
    pub ticks: usize,
}

impl CheckReport {
    /// Règles dont la transaction a été annulée
    pub fn rolled_back(&self) -> impl Iterator<Item = &RuleOutcome> + '_ {
        self.rules.iter().filter(|r| !r.is_committed())
    }
}

/// Moteur de contrôle
pub struct Checker {
    config: CheckConfig,
    ops: Box<dyn GeometryOps>,
    measure: Box<dyn LengthMeasure>,
}

impl Checker {
    /// Crée un moteur avec les capacités géométriques par défaut
    ///
    /// # Errors
    /// `InvalidConfig` si les seuils sont incohérents, `UnsupportedEllipsoid` si l'ellipsoïde
    /// est inconnu.
    pub fn new(config: CheckConfig) -> Result<Self, CheckError> {
        config.validate()?;
        let ellipsoid: Ellipsoid = config.ellipsoid.parse()?;

        Ok(Self {
            config,
            ops: Box::new(GeoOps),
            measure: Box::new(EllipsoidalMeasure::new(ellipsoid)),
        })
    }

    /// Remplace les opérations géométriques (validité, égalité, centroïde)
    pub fn with_ops(mut self, ops: impl GeometryOps + 'static) -> Self {
        self.ops = Box::new(ops);
        self
    }

    /// Remplace la mesure des longueurs
    pub fn with_measure(mut self, measure: impl LengthMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    /// Contrôle une couche
    ///
    /// Les préconditions (couche sélectionnée, projection EPSG:4326) sont vérifiées avant
    /// toute écriture dans `sink`. L'échec d'une transaction n'interrompt pas le contrôle :
    /// la règle est marquée annulée et les suivantes s'exécutent.
    pub fn run_check(
        &self,
        layer: Option<&dyn FeatureSource>,
        is_zoning_or_sector: bool,
        sink: &mut dyn ErrorSink,
        progress: &mut dyn Progress,
    ) -> Result<CheckReport, CheckError> {
        let layer = layer.ok_or(CheckError::NoLayerSelected)?;
        let crs = layer.crs();
        if crs != Crs::WGS84 {
            return Err(CheckError::InvalidCrs { found: crs });
        }

        let pipeline = RuleKind::pipeline(is_zoning_or_sector);
        let count = layer.feature_count();
        let total = count * pipeline.len();

        info!(
            layer = layer.name(),
            features = count,
            rules = pipeline.len(),
            "Starting check"
        );

        sink.begin_run(&format!("{}_error", layer.name()), Schema::error_layer());

        let ctx = RuleContext {
            ops: self.ops.as_ref(),
            measure: self.measure.as_ref(),
            config: &self.config,
        };

        let mut ticks = 0;
        let mut outcomes = Vec::with_capacity(pipeline.len());

        for &kind in pipeline {
            let start = Instant::now();
            let mut rule = kind.instantiate();
            let mut examined = 0;

            let status = match EditSession::begin(sink, kind) {
                Ok(mut session) => {
                    for feature in layer.features() {
                        session.examine(feature.fid);
                        rule.check_feature(&feature, &ctx, &mut session);
                        examined += 1;
                        ticks += 1;
                        progress.on_tick(ticks, total);
                    }
                    match session.commit() {
                        Ok(findings) => RuleStatus::Committed { findings },
                        Err(e) => RuleStatus::RolledBack {
                            reason: e.to_string(),
                        },
                    }
                }
                Err(e) => {
                    // La passe est tout de même comptée pour conserver le total de ticks
                    for _ in 0..count {
                        ticks += 1;
                        progress.on_tick(ticks, total);
                    }
                    RuleStatus::RolledBack {
                        reason: e.to_string(),
                    }
                }
            };

            if let RuleStatus::RolledBack { reason } = &status {
                warn!(rule = %kind, reason = %reason, "Rule findings discarded");
            }

            outcomes.push(RuleOutcome {
                rule: kind,
                status,
                features: examined,
                duration: start.elapsed(),
            });
        }

        let result = sink.commit_run();
        info!(
            layer = result.name(),
            findings = result.len(),
            ticks,
            "Check complete"
        );

        Ok(CheckReport {
            layer: result,
            rules: outcomes,
            ticks,
        })
    }
}

/// Contrôle une couche avec la configuration par défaut et une couche d'erreurs en mémoire
pub fn run_check(
    layer: Option<&dyn FeatureSource>,
    is_zoning_or_sector: bool,
    progress: &mut dyn Progress,
) -> Result<ResultSet, CheckError> {
    let checker = Checker::new(CheckConfig::default())?;
    let mut sink = MemoryErrorLayer::new();
    let report = checker.run_check(layer, is_zoning_or_sector, &mut sink, progress)?;
    Ok(report.layer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Category, Finding, Level};
    use crate::validity::Defect;
    use geo::{point, polygon, Geometry, Point};
    use std::cell::Cell;
    use std::rc::Rc;

    fn square() -> Geometry {
        Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ])
    }

    fn layer(crs: Crs, features: Vec<Feature>) -> MemoryLayer {
        MemoryLayer::new("zonage", crs, features)
    }

    /// Couche d'erreurs qui refuse le commit d'une règle donnée
    struct FailingSink {
        inner: MemoryErrorLayer,
        commits: usize,
        fail_at: usize,
    }

    impl ErrorSink for FailingSink {
        fn begin_run(&mut self, name: &str, schema: Schema) {
            self.inner.begin_run(name, schema)
        }

        fn start_editing(&mut self) -> Result<(), CheckError> {
            self.inner.start_editing()
        }

        fn add_finding(&mut self, finding: Finding) {
            self.inner.add_finding(finding)
        }

        fn commit_changes(&mut self) -> Result<usize, CheckError> {
            self.commits += 1;
            if self.commits == self.fail_at {
                return Err(CheckError::InvalidConfig("disk full".into()));
            }
            self.inner.commit_changes()
        }

        fn rollback(&mut self) {
            self.inner.rollback()
        }

        fn commit_run(&mut self) -> ResultSet {
            self.inner.commit_run()
        }
    }

    #[test]
    fn test_no_layer_selected() {
        let mut sink = MemoryErrorLayer::new();
        let checker = Checker::new(CheckConfig::default()).unwrap();
        let err = checker
            .run_check(None, true, &mut sink, &mut NoProgress)
            .unwrap_err();
        assert!(matches!(err, CheckError::NoLayerSelected));
        assert!(err.is_precondition());
        assert!(sink.committed().is_empty());
    }

    #[test]
    fn test_wrong_crs_fails_before_any_rule() {
        let layer = layer(Crs::from_epsg(2154), vec![Feature::new(1, square())]);
        let mut ticks = 0;
        let mut progress = |current: usize, _total: usize| ticks = current;
        let err = run_check(Some(&layer), true, &mut progress).unwrap_err();

        match err {
            CheckError::InvalidCrs { found } => assert_eq!(found.epsg(), 2154),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ticks, 0);
    }

    #[test]
    fn test_tick_count() {
        let features: Vec<Feature> = (1..=3).map(|fid| Feature::new(fid, square())).collect();
        let layer = layer(Crs::WGS84, features);
        let checker = Checker::new(CheckConfig::default()).unwrap();

        for (zoning, expected) in [(false, 6), (true, 12)] {
            let mut seen = Vec::new();
            let mut progress = |current: usize, total: usize| seen.push((current, total));
            let report = checker
                .run_check(Some(&layer), zoning, &mut MemoryErrorLayer::new(), &mut progress)
                .unwrap();
            assert_eq!(report.ticks, expected);
            assert_eq!(seen.len(), expected);
            assert_eq!(seen.last(), Some(&(expected, expected)));
            assert!(seen.iter().all(|&(_, total)| total == expected));
        }
    }

    #[test]
    fn test_result_layer_name_and_rules() {
        let layer = layer(
            Crs::WGS84,
            vec![Feature::new(1, square()), Feature::new(2, square())],
        );
        let checker = Checker::new(CheckConfig::default()).unwrap();
        let report = checker
            .run_check(Some(&layer), true, &mut MemoryErrorLayer::new(), &mut NoProgress)
            .unwrap();

        assert_eq!(report.layer.name(), "zonage_error");
        let kinds: Vec<RuleKind> = report.rules.iter().map(|r| r.rule).collect();
        assert_eq!(kinds, RuleKind::pipeline(true));
        assert!(report.rules.iter().all(|r| r.features == 2));
        assert_eq!(report.layer.len(), 1);
        assert_eq!(report.layer.findings()[0].category, Category::Duplicate);
    }

    #[test]
    fn test_failed_commit_keeps_previous_rules() {
        let bowtie = Geometry::Polygon(polygon![
            (x: 0.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 2.0, y: 0.0),
            (x: 0.0, y: 2.0),
        ]);
        let layer = layer(
            Crs::WGS84,
            vec![Feature::new(1, bowtie), Feature::new(2, square()), Feature::new(3, square())],
        );
        let mut sink = FailingSink {
            inner: MemoryErrorLayer::new(),
            commits: 0,
            fail_at: 3,
        };
        let checker = Checker::new(CheckConfig::default()).unwrap();
        let report = checker
            .run_check(Some(&layer), true, &mut sink, &mut NoProgress)
            .unwrap();

        let statuses: Vec<bool> = report.rules.iter().map(|r| r.is_committed()).collect();
        assert_eq!(statuses, vec![true, true, false, true]);
        assert_eq!(report.rolled_back().count(), 1);
        assert_eq!(report.layer.len(), 1);
        assert_eq!(report.layer.findings()[0].category, Category::Invalid);
        assert_eq!(report.ticks, 12);
    }

    #[test]
    fn test_stream_is_reacquired_per_rule() {
        let layer = layer(Crs::WGS84, vec![Feature::null(7), Feature::new(8, point!(x: 1.0, y: 1.0))]);
        let checker = Checker::new(CheckConfig::default()).unwrap();
        let report = checker
            .run_check(Some(&layer), true, &mut MemoryErrorLayer::new(), &mut NoProgress)
            .unwrap();
        assert!(report.rules.iter().all(|r| r.features == 2));
        assert!(report.layer.is_empty());
    }

    /// Longueur constante d'un mètre
    struct UnitLength;

    impl LengthMeasure for UnitLength {
        fn measure_length(&self, _geometry: &Geometry) -> f64 {
            1.0
        }
    }

    /// Déclare toute géométrie invalide et compte les appels à l'égalité topologique
    struct RejectAll {
        topo_calls: Rc<Cell<usize>>,
    }

    impl GeometryOps for RejectAll {
        fn validate(&self, _geometry: &Geometry) -> Vec<Defect> {
            vec![Defect {
                location: point!(x: 9.0, y: 9.0),
                message: "Rejected".to_string(),
            }]
        }

        fn equals_topo(&self, a: &Geometry, b: &Geometry) -> bool {
            self.topo_calls.set(self.topo_calls.get() + 1);
            a == b
        }

        fn centroid(&self, _geometry: &Geometry) -> Option<Point> {
            Some(point!(x: 7.0, y: 7.0))
        }
    }

    #[test]
    fn test_injected_measure_drives_ring_density() {
        let config = CheckConfig {
            ring_max_vertices: 4,
            ..Default::default()
        };
        let layer = layer(Crs::WGS84, vec![Feature::new(1, square())]);

        let report = Checker::new(config.clone())
            .unwrap()
            .run_check(Some(&layer), false, &mut MemoryErrorLayer::new(), &mut NoProgress)
            .unwrap();
        assert!(report.layer.is_empty());

        let report = Checker::new(config)
            .unwrap()
            .with_measure(UnitLength)
            .run_check(Some(&layer), false, &mut MemoryErrorLayer::new(), &mut NoProgress)
            .unwrap();
        assert_eq!(report.layer.len(), 1);
        let finding = &report.layer.findings()[0];
        assert_eq!(finding.category, Category::Complex);
        assert_eq!(finding.level, Level::Warning);
        assert_eq!(
            finding.message,
            "Anneau avec plus de 4 points et plus de 0.1 points/mètre"
        );
    }

    #[test]
    fn test_injected_ops_used_by_rules() {
        let topo_calls = Rc::new(Cell::new(0));
        let checker = Checker::new(CheckConfig::default())
            .unwrap()
            .with_ops(RejectAll {
                topo_calls: Rc::clone(&topo_calls),
            });
        let layer = layer(
            Crs::WGS84,
            vec![Feature::new(1, square()), Feature::new(2, square())],
        );
        let report = checker
            .run_check(Some(&layer), true, &mut MemoryErrorLayer::new(), &mut NoProgress)
            .unwrap();

        let rows: Vec<(i64, Category, &str)> = report
            .layer
            .iter()
            .map(|f| (f.fid, f.category, f.message.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (1, Category::Invalid, "Rejected"),
                (2, Category::Invalid, "Rejected"),
                (2, Category::Duplicate, "Géométrie dupliquée"),
            ]
        );
        assert_eq!(report.layer.findings()[0].location, point!(x: 9.0, y: 9.0));
        assert_eq!(report.layer.findings()[2].location, point!(x: 7.0, y: 7.0));
        // Géométries invalides : comparaison exacte uniquement
        assert_eq!(topo_calls.get(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = CheckConfig {
            ellipsoid: "Clarke 1880".into(),
            ..Default::default()
        };
        assert!(matches!(
            Checker::new(config),
            Err(CheckError::UnsupportedEllipsoid(_))
        ));
    }
}
