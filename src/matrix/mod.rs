//! Travel matrices: dense storage, location indexing, the road oracle
//! adapter, and its on-disk cache.

mod cache;
mod index;
mod oracle;
mod travel;

pub use cache::MatrixCache;
pub use index::LocationIndex;
pub use oracle::{
    HttpOracle, MatrixProvider, OracleBlock, RoadOracle, FALLBACK_SPEED_KMH,
};
pub use travel::{Matrix, TravelMatrix};
