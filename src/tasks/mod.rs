//! Background Tasks Module
//!
//! # Tasks
//! - Debounced sweep: an `ExpiringCache` reconciles capacity and expiry shortly
//!   after the last mutation

mod debounce;

pub use debounce::Debouncer;
