use anyhow::Result;
use hotel_knn::{features, Backend, Coordinate, FeatureVector, Params, ReferenceIndex};

fn distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f32>()
        .sqrt()
}

const AMENITIES: [&str; 4] = ["WiFi", "Bar", "Lift", "Restaurant"];

// Small deterministic grid of hotels across the continental US.
fn corpus() -> Result<Vec<(String, FeatureVector)>> {
    let mut rows = Vec::new();
    for i in 0..60i64 {
        let lat = 25.0 + (i % 12) as f64 * 1.75;
        let lon = -120.0 + (i * 7 % 50) as f64;
        let rating = i % 5 + 1;
        let picked: Vec<&str> = AMENITIES
            .iter()
            .enumerate()
            .filter(|(j, _)| ((i as usize) >> j) & 1 == 1)
            .map(|(_, a)| *a)
            .collect();
        let v = features::build(Coordinate::new(lat, lon)?, rating, picked)?;
        rows.push((format!("H{i:03}"), v));
    }
    Ok(rows)
}

fn index(params: Params) -> Result<ReferenceIndex> {
    let rows = corpus()?;
    Ok(ReferenceIndex::from_rows(
        rows.into_iter().map(|(c, v)| (c.as_str().into(), v)).collect(),
        params,
    ))
}

#[test]
fn exhaustive_search() -> Result<()> {
    let rows = corpus()?;
    let db = index(Params::default())?;
    let query = features::build(Coordinate::new(33.3, -97.2)?, 4, ["WiFi", "Bar"])?;
    let results = db.query(&query, 10)?;
    let mut expected: Vec<(usize, f32)> = rows
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i, distance(query.as_slice(), v.as_slice())))
        .collect();
    expected.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    assert_eq!(results.len(), 10);
    for (res, exp) in results.iter().zip(expected.iter()) {
        assert_eq!(res.code.0, rows[exp.0].0);
        assert_eq!(res.distance, exp.1);
    }
    Ok(())
}

#[test]
fn result_sizes_and_order() -> Result<()> {
    let db = index(Params::default())?;
    let query = features::build(Coordinate::new(40.0, -100.0)?, 2, ["Lift"])?;
    for k in [1, 7, 59, 60] {
        let results = db.query(&query, k)?;
        assert_eq!(results.len(), k);
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
    }
    assert_eq!(db.query(&query, 61)?.len(), 60);
    assert_eq!(db.query(&query, 1000)?.len(), 60);
    Ok(())
}

#[test]
fn repeated_queries_are_identical() -> Result<()> {
    for backend in [Backend::Exact, Backend::Hnsw] {
        let db = index(Params {
            backend,
            ..Params::default()
        })?;
        let query = features::build(Coordinate::new(30.0, -90.0)?, 5, ["Restaurant"])?;
        assert_eq!(db.query(&query, 8)?, db.query(&query, 8)?);
    }
    Ok(())
}

#[test]
fn reference_vector_finds_itself() -> Result<()> {
    let rows = corpus()?;
    let db = index(Params::default())?;
    for (code, v) in rows.iter().step_by(7) {
        let results = db.query(v, 1)?;
        assert_eq!(&results[0].code.0, code);
        assert_eq!(results[0].distance, 0.0);
    }
    Ok(())
}

#[test]
fn graph_backend_with_full_beam_is_exact() -> Result<()> {
    let exact = index(Params::default())?;
    let graph = index(Params {
        backend: Backend::Hnsw,
        ef_search: 64,
        ..Params::default()
    })?;
    let query = features::build(Coordinate::new(36.5, -110.0)?, 3, ["WiFi"])?;
    let a = exact.query(&query, 5)?;
    let b = graph.query(&query, 5)?;
    assert_eq!(a, b);
    Ok(())
}

#[test]
fn graph_backend_handles_every_k() -> Result<()> {
    let exact = index(Params::default())?;
    let graph = index(Params {
        backend: Backend::Hnsw,
        ..Params::default()
    })?;
    let query = features::build(Coordinate::new(31.0, -95.0)?, 2, ["Bar", "Lift"])?;
    for k in [1, 5, 55, 60, 61, 100] {
        let results = graph.query(&query, k)?;
        assert_eq!(results.len(), k.min(60), "k = {k}");
        assert!(results.windows(2).all(|w| w[0].distance <= w[1].distance));
        if k >= 60 {
            assert_eq!(results, exact.query(&query, k)?, "k = {k}");
        }
    }
    Ok(())
}
