//! Table-driven convergence checks against the cases in `tests/data`.

use northfit::{BuiltinTransform, Crs, Extent, TrueNorthCalculator};
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct Case {
    case_id: String,
    crs: String,
    extent: [f64; 4],
    expected_deg: f64,
    #[serde(default = "default_tolerance")]
    tolerance_deg: f64,
}

fn default_tolerance() -> f64 {
    0.1
}

#[derive(Debug, Deserialize)]
struct CaseFile {
    cases: Vec<Case>,
}

fn load_cases() -> Vec<Case> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/true_north_cases.json");
    let text = fs::read_to_string(&path).expect("read case file");
    let file: CaseFile = serde_json::from_str(&text).expect("parse case file");
    file.cases
}

#[test]
fn convergence_matches_reference_cases() {
    let cases = load_cases();
    assert!(!cases.is_empty());
    let geo = BuiltinTransform::new();
    let calc = TrueNorthCalculator::new();
    for case in &cases {
        let crs: Crs = case.crs.parse().expect("crs id");
        let [xmin, ymin, xmax, ymax] = case.extent;
        let extent = Extent::new(xmin, ymin, xmax, ymax);
        let angle = calc
            .convergence_angle(&extent, &crs, &geo)
            .unwrap_or_else(|e| panic!("{}: {e}", case.case_id));
        assert!(
            (angle - case.expected_deg).abs() <= case.tolerance_deg,
            "{}: expected {} got {angle}",
            case.case_id,
            case.expected_deg
        );
    }
}
