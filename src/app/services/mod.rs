//! Core business logic services

pub mod batch_pipeline;
pub mod export;
pub mod output_namer;
pub mod placeholder;
pub mod renderer;
pub mod schema_validator;
pub mod table_reader;
