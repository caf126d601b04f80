use hnsw::{Hnsw, Searcher};
use ordered_float::OrderedFloat;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use space::Neighbor as GraphNeighbor;
use tracing::{debug, info, warn};

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::features::encode_record;
use crate::metrics::{euclidean, EuclideanMetric};
use crate::params::{Backend, Params};
use crate::schema::FeatureVector;
use crate::types::{HotelCode, Neighbor, QueryResult};

const M: usize = 12;
const M0: usize = 24;

type Graph = Hnsw<EuclideanMetric, FeatureVector, Pcg64, M, M0>;

/// Read-only nearest-neighbor index over reference feature vectors.
///
/// `codes[i]` identifies the hotel whose vector is `rows[i]`; the two are
/// built together and never reordered.
pub struct ReferenceIndex {
    codes: Vec<HotelCode>,
    rows: Vec<FeatureVector>,
    params: Params,
    graph: Option<Graph>,
}

impl ReferenceIndex {
    pub fn from_rows(entries: Vec<(HotelCode, FeatureVector)>, params: Params) -> Self {
        let (codes, rows): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
        let graph = match params.backend {
            Backend::Exact => None,
            Backend::Hnsw => {
                let hnsw_params = hnsw::Params::new().ef_construction(params.ef_construction);
                let mut graph: Graph = Hnsw::new_params(EuclideanMetric, hnsw_params);
                let mut searcher = Searcher::default();
                for row in &rows {
                    graph.insert(*row, &mut searcher);
                }
                Some(graph)
            }
        };
        Self {
            codes,
            rows,
            params,
            graph,
        }
    }

    /// Fits the index over every dataset row that can be encoded.
    pub fn fit(dataset: &Dataset, params: Params) -> Self {
        let mut entries = Vec::with_capacity(dataset.len());
        let mut skipped = 0usize;
        for record in dataset.records() {
            match encode_record(record) {
                Some(v) => entries.push((record.code.clone(), v)),
                None => {
                    skipped += 1;
                    debug!(code = %record.code, "row lacks coordinate or rating, not indexed");
                }
            }
        }
        if skipped > 0 {
            warn!(skipped, "dataset rows left out of the index");
        }
        info!(rows = entries.len(), backend = ?params.backend, "fitted reference index");
        Self::from_rows(entries, params)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn params(&self) -> Params {
        self.params
    }

    pub fn codes(&self) -> &[HotelCode] {
        &self.codes
    }

    pub fn rows(&self) -> &[FeatureVector] {
        &self.rows
    }

    /// Returns the `k` rows closest to `vector`, nearest first.
    ///
    /// Ties are broken by row order. Asking for more rows than the index holds
    /// returns every row.
    pub fn query(&self, vector: &FeatureVector, k: usize) -> Result<QueryResult> {
        if k == 0 {
            return Err(Error::InvalidInput("k must be greater than zero".into()));
        }
        let ranked = match &self.graph {
            None => self.exact(vector, k),
            Some(graph) => self.approximate(graph, vector, k),
        };
        debug!(k, found = ranked.len(), "knn query");
        Ok(ranked
            .into_iter()
            .map(|(distance, row)| Neighbor {
                code: self.codes[row].clone(),
                distance: distance.into_inner(),
            })
            .collect())
    }

    pub fn query_batch(&self, vectors: &[FeatureVector], k: usize) -> Result<Vec<QueryResult>> {
        vectors.par_iter().map(|v| self.query(v, k)).collect()
    }

    fn exact(&self, vector: &FeatureVector, k: usize) -> Vec<(OrderedFloat<f32>, usize)> {
        let mut scored: Vec<(OrderedFloat<f32>, usize)> = self
            .rows
            .par_iter()
            .enumerate()
            .map(|(row, r)| (OrderedFloat(euclidean(vector.as_slice(), r.as_slice())), row))
            .collect();
        if k < scored.len() {
            scored.select_nth_unstable(k - 1);
            scored.truncate(k);
        }
        scored.sort_unstable();
        scored
    }

    fn approximate(
        &self,
        graph: &Graph,
        vector: &FeatureVector,
        k: usize,
    ) -> Vec<(OrderedFloat<f32>, usize)> {
        let ef = self.params.ef_search.max(k);
        // A beam covering every row is a full scan; the graph also cannot
        // fill more slots than it visits.
        if ef >= self.rows.len() {
            return self.exact(vector, k);
        }
        let mut neighbors = vec![
            GraphNeighbor {
                index: !0,
                distance: 0
            };
            k
        ];
        let mut searcher = Searcher::default();
        let found = graph.nearest(vector, ef, &mut searcher, &mut neighbors);
        let mut scored: Vec<(OrderedFloat<f32>, usize)> = found
            .iter()
            .filter(|n| n.index < self.rows.len())
            .map(|n| {
                let d = euclidean(vector.as_slice(), self.rows[n.index].as_slice());
                (OrderedFloat(d), n.index)
            })
            .collect();
        scored.sort_unstable();
        scored.dedup_by_key(|(_, row)| *row);
        scored.truncate(k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::build;
    use crate::types::Coordinate;

    fn vector(lat: f64, lon: f64, rating: i64, amenities: &[&str]) -> FeatureVector {
        build(Coordinate::new(lat, lon).unwrap(), rating, amenities).unwrap()
    }

    fn sample(params: Params) -> ReferenceIndex {
        ReferenceIndex::from_rows(
            vec![
                ("A".into(), vector(42.36, -71.06, 4, &["WiFi"])),
                ("B".into(), vector(42.35, -71.07, 3, &[])),
                ("C".into(), vector(40.71, -74.00, 5, &["Bar"])),
                ("D".into(), vector(42.36, -71.06, 4, &["WiFi"])),
                ("E".into(), vector(34.05, -118.24, 2, &["Lift"])),
            ],
            params,
        )
    }

    fn codes(result: &QueryResult) -> Vec<&str> {
        result.iter().map(|n| n.code.0.as_str()).collect()
    }

    #[test]
    fn exact_match_ranks_first_and_ties_follow_row_order() {
        let index = sample(Params::default());
        let result = index.query(&vector(42.36, -71.06, 4, &["WiFi"]), 3).unwrap();
        assert_eq!(codes(&result), ["A", "D", "B"]);
        assert_eq!(result[0].distance, 0.0);
        assert_eq!(result[1].distance, 0.0);
    }

    #[test]
    fn k_larger_than_index_returns_everything() {
        let index = sample(Params::default());
        let result = index.query(&vector(0.0, 0.0, 1, &[]), 50).unwrap();
        assert_eq!(result.len(), index.len());
        assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    #[test]
    fn zero_k_is_rejected() {
        let index = sample(Params::default());
        let err = index.query(&vector(0.0, 0.0, 1, &[]), 0).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = ReferenceIndex::from_rows(Vec::new(), Params::default());
        assert!(index.query(&vector(0.0, 0.0, 1, &[]), 3).unwrap().is_empty());
    }

    #[test]
    fn graph_backend_agrees_on_small_sets() {
        let params = Params {
            backend: Backend::Hnsw,
            ..Params::default()
        };
        let approx = sample(params);
        let exact = sample(Params::default());
        let q = vector(41.0, -73.0, 4, &["Bar"]);
        assert_eq!(approx.query(&q, 5).unwrap(), exact.query(&q, 5).unwrap());
    }

    #[test]
    fn batch_matches_single_queries() {
        let index = sample(Params::default());
        let queries = [vector(42.0, -71.0, 3, &[]), vector(34.0, -118.0, 2, &["Lift"])];
        let batch = index.query_batch(&queries, 2).unwrap();
        for (q, got) in queries.iter().zip(batch) {
            assert_eq!(got, index.query(q, 2).unwrap());
        }
    }
}
