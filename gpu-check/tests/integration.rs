//! Tests d'intégration : contrôles complets sur des couches en mémoire

use geo::{point, polygon, Geometry, LineString, MultiPolygon, Polygon};
use gpu_check::{
    run_check, Category, CheckConfig, CheckError, Checker, Crs, Feature, FeatureSource, Level,
    MemoryErrorLayer, MemoryLayer, NoProgress, RuleKind, RuleStatus,
};

fn parcel(x0: f64, y0: f64) -> Geometry {
    Geometry::Polygon(polygon![
        (x: x0, y: y0),
        (x: x0 + 0.001, y: y0),
        (x: x0 + 0.001, y: y0 + 0.001),
        (x: x0, y: y0 + 0.001),
    ])
}

fn bowtie() -> Geometry {
    Geometry::Polygon(polygon![
        (x: 2.0, y: 48.0),
        (x: 2.002, y: 48.002),
        (x: 2.002, y: 48.0),
        (x: 2.0, y: 48.002),
    ])
}

fn wgs84(features: Vec<Feature>) -> MemoryLayer {
    MemoryLayer::new("zone_urba", Crs::WGS84, features)
}

#[test]
fn test_self_intersecting_polygon() {
    let layer = wgs84(vec![Feature::new(1, parcel(2.0, 48.0)), Feature::new(2, bowtie())]);
    let result = run_check(Some(&layer), false, &mut NoProgress).unwrap();

    assert_eq!(result.name(), "zone_urba_error");
    assert_eq!(result.len(), 1);

    let finding = &result.findings()[0];
    assert_eq!(finding.fid, 2);
    assert_eq!(finding.level, Level::Error);
    assert_eq!(finding.category, Category::Invalid);
    assert_eq!(finding.message, "Self-intersection");
    assert!((finding.location.x() - 2.001).abs() < 1e-9);
    assert!((finding.location.y() - 48.001).abs() < 1e-9);
}

#[test]
fn test_two_identical_polygons() {
    let layer = wgs84(vec![
        Feature::new(10, parcel(2.0, 48.0)),
        Feature::new(11, parcel(2.0, 48.0)),
    ]);
    let result = run_check(Some(&layer), true, &mut NoProgress).unwrap();

    let duplicates: Vec<_> = result.by_category(Category::Duplicate).collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].fid, 11);
    assert_eq!(result.len(), 1);
}

#[test]
fn test_duplicates_only_on_zoning_layers() {
    let layer = wgs84(vec![
        Feature::new(10, parcel(2.0, 48.0)),
        Feature::new(11, parcel(2.0, 48.0)),
    ]);
    let result = run_check(Some(&layer), false, &mut NoProgress).unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_zoning_run_with_boundary_rule() {
    let layer = wgs84((0..5).map(|i| Feature::new(i, parcel(2.0 + i as f64 * 0.01, 48.0))).collect());
    let checker = Checker::new(CheckConfig::default()).unwrap();
    let report = checker
        .run_check(Some(&layer), true, &mut MemoryErrorLayer::new(), &mut NoProgress)
        .unwrap();

    let boundary = report
        .rules
        .iter()
        .find(|r| r.rule == RuleKind::Boundary)
        .unwrap();
    assert_eq!(boundary.status, RuleStatus::Committed { findings: 0 });
    assert_eq!(boundary.features, 5);
    assert_eq!(report.layer.by_category(Category::Boundary).count(), 0);
    assert_eq!(report.ticks, 20);
}

#[test]
fn test_projected_layer_rejected() {
    let layer = MemoryLayer::new("zone_urba", Crs::from_epsg(2154), vec![Feature::new(1, bowtie())]);
    let mut sink = MemoryErrorLayer::new();
    let mut ticks = 0;
    let mut progress = |current: usize, _total: usize| ticks = current;

    let checker = Checker::new(CheckConfig::default()).unwrap();
    let err = checker
        .run_check(Some(&layer), true, &mut sink, &mut progress)
        .unwrap_err();

    assert!(matches!(err, CheckError::InvalidCrs { .. }));
    assert!(err.to_string().contains("EPSG:2154"));
    assert!(!sink.is_editing());
    assert!(sink.committed().is_empty());
    assert_eq!(ticks, 0);
}

#[test]
fn test_no_layer_message() {
    let err = run_check(None, false, &mut NoProgress).unwrap_err();
    assert_eq!(err.to_string(), "Aucune couche active. Sélectionner une couche.");
}

#[test]
fn test_valid_polygon_after_overlapping_invalid_one() {
    let layer = wgs84(vec![
        Feature::new(1, bowtie()),
        Feature::new(2, parcel(2.0, 48.0)),
        Feature::new(3, bowtie()),
    ]);
    let result = run_check(Some(&layer), true, &mut NoProgress).unwrap();

    let rows: Vec<(i64, Category)> = result.iter().map(|f| (f.fid, f.category)).collect();
    assert_eq!(
        rows,
        vec![
            (1, Category::Invalid),
            (3, Category::Invalid),
            (3, Category::Duplicate),
        ]
    );
}

#[test]
fn test_findings_follow_rule_then_feature_order() {
    let many_holes = Polygon::new(
        LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)]),
        (0..3)
            .map(|i| {
                let x = 0.1 + i as f64 * 0.2;
                LineString::from(vec![(x, 0.1), (x + 0.1, 0.1), (x + 0.1, 0.2), (x, 0.1)])
            })
            .collect(),
    );
    let config = CheckConfig {
        inner_rings_warning: 1,
        inner_rings_error: 2,
        ..Default::default()
    };
    let layer = wgs84(vec![
        Feature::new(1, many_holes.clone()),
        Feature::new(2, bowtie()),
        Feature::new(3, many_holes),
    ]);
    let checker = Checker::new(config).unwrap();
    let report = checker
        .run_check(Some(&layer), true, &mut MemoryErrorLayer::new(), &mut NoProgress)
        .unwrap();

    let rows: Vec<(i64, Category, Level)> = report
        .layer
        .iter()
        .map(|f| (f.fid, f.category, f.level))
        .collect();
    assert_eq!(
        rows,
        vec![
            (2, Category::Invalid, Level::Error),
            (1, Category::Complex, Level::Error),
            (3, Category::Complex, Level::Error),
            (3, Category::Duplicate, Level::Error),
        ]
    );
    assert_eq!(report.layer.findings()[1].message, "Nombre de trous supérieur à 2");
}

#[test]
fn test_multipolygon_parts_warning() {
    let parts: Vec<Polygon> = (0..501)
        .map(|i| match parcel(i as f64 * 0.01, 0.0) {
            Geometry::Polygon(p) => p,
            _ => unreachable!(),
        })
        .collect();
    let layer = wgs84(vec![Feature::new(1, MultiPolygon::new(parts))]);
    let result = run_check(Some(&layer), false, &mut NoProgress).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.findings()[0].level, Level::Warning);
    assert_eq!(result.findings()[0].message, "Nombre de parts supérieur à 500");
}

#[test]
fn test_custom_feature_source() {
    /// Source qui génère ses features à chaque parcours
    struct Generated(usize);

    impl FeatureSource for Generated {
        fn name(&self) -> &str {
            "generated"
        }

        fn crs(&self) -> Crs {
            Crs::WGS84
        }

        fn feature_count(&self) -> usize {
            self.0
        }

        fn features(&self) -> Box<dyn Iterator<Item = Feature> + '_> {
            Box::new((0..self.0).map(|i| Feature::new(i as i64, point!(x: 1.0, y: 1.0))))
        }
    }

    let source = Generated(4);
    let result = run_check(Some(&source), true, &mut NoProgress).unwrap();
    assert_eq!(result.name(), "generated_error");
    assert_eq!(result.by_category(Category::Duplicate).count(), 3);
}
