//! Query functions grouped per table. Repos hold no state; every method
//! takes the pool explicitly.

pub mod exhibit_repo;
pub mod sensor_reading_repo;

pub use exhibit_repo::ExhibitRepo;
pub use sensor_reading_repo::SensorReadingRepo;
