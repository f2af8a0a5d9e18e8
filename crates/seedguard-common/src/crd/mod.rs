//! Resource types seedguard reads
//!
//! Seeds are owned by the Gardener API server; only the fields the
//! retention policy needs are modelled here.

mod seed;

pub use seed::{Seed, SeedBackup, SeedSpec, SEED_API_VERSION, SEED_GROUP, SEED_KIND, SEED_VERSION};
