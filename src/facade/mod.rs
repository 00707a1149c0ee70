mod database;

pub use database::InMemoryDB;
