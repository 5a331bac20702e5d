//! StayHub Backend Library
//!
//! This library exports the core modules for the StayHub backend server:
//! a property-rental marketplace with listings, bookings, reviews, and a
//! two-phase external payment flow.

pub mod app_state;
pub mod auth;
pub mod booking;
pub mod booking_service;
pub mod config;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod listing;
pub mod listing_service;
pub mod models;
pub mod notifier;
pub mod payment;
pub mod payment_service;
pub mod review;
pub mod review_service;
pub mod routes;
pub mod user_service;
