// SkySweep: follower hygiene and account cleanup for Bluesky.
//
// This is the library root. Each module corresponds to a major subsystem:
// the remote interface, profile scoring, the pipelines that walk and act
// on remote collections, and operator output.

pub mod bluesky;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod scoring;
