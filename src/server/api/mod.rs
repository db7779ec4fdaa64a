pub mod catalog_controller;
pub mod health_controller;
