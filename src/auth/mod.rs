pub mod handler;
pub mod middleware;
pub mod model;
pub mod password;
pub mod routes;
pub mod service;
pub mod token;
