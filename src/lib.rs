// Topic Explorer: sample topic clusters and highlight what they share.
//
// This is the library root. The keyword and sampler modules are the pure
// core; dataset, session, config and output wrap them for the CLI.

pub mod config;
pub mod dataset;
pub mod errors;
pub mod keywords;
pub mod output;
pub mod sampler;
pub mod session;
