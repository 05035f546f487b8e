mod validator;

pub mod access;
pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod password;
pub mod routes;
pub mod services;

pub use validator::JwtValidator;
