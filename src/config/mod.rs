//! Run configuration: hub network, fleet document, and cache settings.

mod file;
mod hub;

pub use file::{load_config, parse_config, AppConfig, CacheConfig};
pub use hub::{
    BlindVanMode, EnRoutePolicy, HubConfig, MultiHubConfig, SourceAssignmentConfig,
    SourceMode, UnassignedZonePolicy,
};
