// Checkpoint management over the watermark store

pub mod manager;

pub use manager::CheckpointManager;
