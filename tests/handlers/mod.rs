mod auth;
mod health;
mod pets;
mod settings;
