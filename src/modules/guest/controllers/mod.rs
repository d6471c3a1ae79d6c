pub mod guest_controller;

pub use guest_controller::configure;
