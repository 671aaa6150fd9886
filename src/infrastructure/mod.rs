// Infrastructure layer - files, configuration and other external inputs
pub mod config;
pub mod loader;
