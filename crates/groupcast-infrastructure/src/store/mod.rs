//! Record store module (PostgREST adapters)

pub mod connection;
pub mod postgrest;

pub use connection::create_client;
pub use postgrest::PostgrestGroupRepository;
