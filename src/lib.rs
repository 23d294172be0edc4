// Library for tests to access modules

pub mod backend_repo;
pub mod config;
pub mod feed;
pub mod health;
pub mod models;
pub mod routes;
pub mod version;
pub mod worker;
