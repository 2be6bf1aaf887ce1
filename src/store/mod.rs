pub mod graph;

pub use graph::{SharedGraph, SocialGraph};
