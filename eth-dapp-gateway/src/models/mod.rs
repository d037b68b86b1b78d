//! Data models used throughout the application
//!
//! This module contains the request/response bodies of the HTTP surface and the
//! small parsing and unit-conversion helpers shared by the service.

// Address parsing helpers
pub mod hex;

// Request bodies and query strings
pub mod requests;

// Response bodies
pub mod responses;

// Wei / ether / gwei / USD conversions
pub mod units;
