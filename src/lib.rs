// Astroturf: coordinated inauthentic comment detection
//
// This is the library root. Each module corresponds to a stage of the
// scoring pipeline, leaf modules first.

pub mod comments;
pub mod config;
pub mod detect;
pub mod error;
pub mod features;
pub mod output;
pub mod pipeline;
pub mod scoring;
pub mod similarity;
pub mod topics;
