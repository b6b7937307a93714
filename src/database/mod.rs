//! Base de datos
//!
//! Este módulo contiene la conexión a PostgreSQL.

pub mod connection;

pub use connection::create_pool;
