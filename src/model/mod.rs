pub mod data_core;
pub mod edit_sync;
pub mod export;
pub mod grid;
pub mod ingest;
pub mod translation_set;
pub mod validator;
