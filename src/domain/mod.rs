// Domain layer - dashboard document model and lint outcomes
pub mod dashboard;
pub mod lint;
