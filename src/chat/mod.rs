pub mod gateway;
pub mod handler;
pub mod model;
pub mod routes;
pub mod service;
pub mod sessions;
