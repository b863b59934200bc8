pub mod config;
pub mod db;
pub mod elec;
pub mod energy_mix;
pub mod error;
pub mod transform;
pub mod updater;
