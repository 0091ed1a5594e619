mod auth;
mod customers;
mod helpers;
