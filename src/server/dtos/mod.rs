pub mod catalog_dto;
pub mod health_dto;
