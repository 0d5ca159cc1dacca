//! Tests for authentication service

mod reset_tests;
