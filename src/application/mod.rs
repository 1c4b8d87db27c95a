/// Application layer: use cases, shared services and the asset pipeline
pub mod assets;
pub mod services;
pub mod use_cases;
