//! External API integrations

pub mod earth_engine;

pub use earth_engine::EarthEngineClient;
