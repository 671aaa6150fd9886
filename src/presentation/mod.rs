// Presentation layer - command line surface and result output
pub mod cli;
pub mod report;
