pub mod api;
pub mod booking;
pub mod catalog;
pub mod checkout;
pub mod payments;
pub mod profile;
pub mod tickets;
