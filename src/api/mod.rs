pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod settings;
pub mod suppliers;
pub mod users;
