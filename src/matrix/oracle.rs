//! Road distance oracle adapter.
//!
//! Wraps an external routing service behind the [`RoadOracle`] trait,
//! caches full matrices on disk, and falls back to great-circle estimates
//! whenever the service misbehaves, so a solve never fails because the road
//! network was unreachable.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::matrix::{Matrix, MatrixCache, TravelMatrix};
use crate::models::{GeoPoint, Location};

/// Urban fallback speed used for great-circle duration estimates.
pub const FALLBACK_SPEED_KMH: f64 = 25.0;

/// Origin/destination block size per oracle request, keeping request
/// bodies well under typical service limits.
const BATCH_SIZE: usize = 100;

/// One origin-set × destination-set block of road travel values.
pub struct OracleBlock {
    /// Row-major distances in kilometers, `[origin][destination]`.
    pub distances_km: Vec<Vec<f64>>,
    /// Row-major durations in minutes, `[origin][destination]`.
    pub durations_min: Vec<Vec<f64>>,
}

/// A road-network travel oracle.
///
/// Implementations answer dense origin × destination blocks; the provider
/// handles batching, caching, and fallback.
pub trait RoadOracle {
    fn matrix(&self, origins: &[GeoPoint], destinations: &[GeoPoint]) -> Result<OracleBlock>;
}

#[derive(Serialize)]
struct WireCoordinate {
    lat: f64,
    lng: f64,
}

#[derive(Serialize)]
struct MatrixRequest {
    sources: Vec<WireCoordinate>,
    targets: Vec<WireCoordinate>,
}

#[derive(Deserialize)]
struct MatrixResponse {
    /// Meters, `[source][target]`.
    distances: Vec<Vec<f64>>,
    /// Seconds, `[source][target]`.
    durations: Vec<Vec<f64>>,
}

/// HTTP client for a dense-matrix routing endpoint.
pub struct HttpOracle {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpOracle {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Oracle(format!("building HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

impl RoadOracle for HttpOracle {
    fn matrix(&self, origins: &[GeoPoint], destinations: &[GeoPoint]) -> Result<OracleBlock> {
        let request = MatrixRequest {
            sources: origins
                .iter()
                .map(|p| WireCoordinate {
                    lat: p.lat(),
                    lng: p.lng(),
                })
                .collect(),
            targets: destinations
                .iter()
                .map(|p| WireCoordinate {
                    lat: p.lat(),
                    lng: p.lng(),
                })
                .collect(),
        };

        let url = format!("{}/matrix", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(|e| Error::Oracle(format!("request to {url} failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Oracle(format!(
                "{url} returned status {}",
                response.status()
            )));
        }

        let body: MatrixResponse = response
            .json()
            .map_err(|e| Error::Oracle(format!("malformed matrix response: {e}")))?;

        if body.distances.len() != origins.len() || body.durations.len() != origins.len() {
            return Err(Error::Oracle(format!(
                "matrix response has {} rows, expected {}",
                body.distances.len(),
                origins.len()
            )));
        }

        let distances_km = body
            .distances
            .iter()
            .map(|row| row.iter().map(|m| m / 1000.0).collect())
            .collect();
        let durations_min = body
            .durations
            .iter()
            .map(|row| row.iter().map(|s| s / 60.0).collect())
            .collect();

        Ok(OracleBlock {
            distances_km,
            durations_min,
        })
    }
}

/// Produces full travel matrices for a location sequence.
///
/// Lookup order: disk cache, then the oracle (batched), then the
/// great-circle fallback. The caller sees a pure function of the location
/// sequence.
pub struct MatrixProvider<O> {
    oracle: Option<O>,
    cache: MatrixCache,
    fallback_speed_kmh: f64,
}

impl<O: RoadOracle> MatrixProvider<O> {
    pub fn new(oracle: Option<O>, cache: MatrixCache) -> Self {
        Self {
            oracle,
            cache,
            fallback_speed_kmh: FALLBACK_SPEED_KMH,
        }
    }

    pub fn with_fallback_speed(mut self, speed_kmh: f64) -> Self {
        self.fallback_speed_kmh = speed_kmh;
        self
    }

    /// Returns `(distance, duration)` matrices covering `locations` in
    /// order. Fails only on an empty location list.
    pub fn matrices(&self, locations: &[Location]) -> Result<TravelMatrix> {
        if locations.is_empty() {
            return Err(Error::Config("location list cannot be empty".into()));
        }
        let points: Vec<GeoPoint> = locations.iter().map(|l| l.point()).collect();
        let key = MatrixCache::key_for(&points);

        if let Some(cached) = self.cache.load(&key) {
            if cached.size() == points.len() {
                debug!(locations = points.len(), "travel matrix cache hit");
                return Ok(cached);
            }
        }

        let matrices = match &self.oracle {
            Some(oracle) => match self.fetch(oracle, &points) {
                Ok(m) => {
                    self.cache.store(&key, &m);
                    m
                }
                Err(err) => {
                    warn!(%err, "road oracle failed, using great-circle fallback");
                    TravelMatrix::great_circle(&points, self.fallback_speed_kmh)
                }
            },
            None => {
                info!(
                    locations = points.len(),
                    "no road oracle configured, using great-circle estimates"
                );
                TravelMatrix::great_circle(&points, self.fallback_speed_kmh)
            }
        };

        Ok(matrices)
    }

    fn fetch(&self, oracle: &O, points: &[GeoPoint]) -> Result<TravelMatrix> {
        let n = points.len();
        let mut distance = Matrix::new(n);
        let mut duration = Matrix::new(n);

        for row_start in (0..n).step_by(BATCH_SIZE) {
            let row_end = (row_start + BATCH_SIZE).min(n);
            for col_start in (0..n).step_by(BATCH_SIZE) {
                let col_end = (col_start + BATCH_SIZE).min(n);
                let block =
                    oracle.matrix(&points[row_start..row_end], &points[col_start..col_end])?;

                for (bi, i) in (row_start..row_end).enumerate() {
                    let drow = block.distances_km.get(bi).ok_or_else(|| {
                        Error::Oracle("matrix response shorter than requested".into())
                    })?;
                    let trow = block.durations_min.get(bi).ok_or_else(|| {
                        Error::Oracle("matrix response shorter than requested".into())
                    })?;
                    if drow.len() != col_end - col_start || trow.len() != col_end - col_start {
                        return Err(Error::Oracle(
                            "matrix response row width mismatch".into(),
                        ));
                    }
                    for (bj, j) in (col_start..col_end).enumerate() {
                        if i != j {
                            distance.set(i, j, drow[bj]);
                            duration.set(i, j, trow[bj]);
                        }
                    }
                }
            }
        }

        TravelMatrix::new(distance, duration)
            .ok_or_else(|| Error::Oracle("inconsistent matrix sizes".into()))
    }
}
