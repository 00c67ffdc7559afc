use foundation::math::{LonLat, MultiPolygon, Polygon};
use scene::{GeographyIndex, RawGridRow, StateFeature};

fn rect_state(id: &str, name: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> StateFeature {
    let ring = vec![
        LonLat::new(x0, y0),
        LonLat::new(x1, y0),
        LonLat::new(x1, y1),
        LonLat::new(x0, y1),
    ];
    StateFeature::new(id, name, MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
}

pub(crate) fn geography() -> GeographyIndex {
    GeographyIndex::new(vec![
        rect_state("08", "Colorado", -109.0, 37.0, -102.0, 41.0),
        rect_state("20", "Kansas", -102.0, 37.0, -94.6, 40.0),
        rect_state("36", "New York", -79.8, 40.5, -71.8, 45.0),
    ])
}

pub(crate) fn row(lon: f64, lat: f64, year: i32, variable: &str, anom: Option<f64>) -> RawGridRow {
    RawGridRow {
        lon: Some(lon),
        lat: Some(lat),
        year: Some(year),
        variable: Some(variable.to_string()),
        scenario: None,
        anom,
    }
}
