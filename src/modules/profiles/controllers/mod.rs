pub mod profile_controller;

pub use profile_controller::configure;
