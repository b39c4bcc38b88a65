#![deny(dead_code)]
#![deny(unused_imports)]
pub mod candidates;
pub mod data;
pub mod features;
pub mod interaction;
pub mod mediation;
pub mod network;
pub mod pipeline;
pub mod score;
pub mod stats;
pub mod types;
