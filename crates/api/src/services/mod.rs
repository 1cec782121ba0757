//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, login, bearer tokens, profile updates
//! - `users` - Admin account management
//! - `orders` - Checkout transaction and order history
//! - `payment` - Stripe payment intents and webhook verification
//!
//! Catalog, cart, comment and report endpoints are plain CRUD and talk to
//! their repositories directly.

pub mod auth;
pub mod orders;
pub mod payment;
pub mod users;
