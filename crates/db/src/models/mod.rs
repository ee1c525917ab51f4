//! Row types for `exhibits` and `sensor_readings` plus their insert and
//! update inputs.

pub mod exhibit;
pub mod sensor_reading;
