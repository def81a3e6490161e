// Bluesky API surface: the remote social graph SkySweep scans and cleans.
//
// `traits` defines what the pipelines need, `client` implements it over
// XRPC, `models` holds the typed views, `error` the failure taxonomy.

pub mod client;
pub mod error;
pub mod models;
pub mod traits;
