//! Session tracking with inactivity timeout

mod tracker;


pub use tracker::SessionTracker;
