//! Integration Tests Module
//!
//! End-to-end tests for Flora Lens: the two-stage identification flow, the
//! bounded result cache, reminder scheduling, and the command layer.

// Shared mock gateway and payload fixtures
mod support;

// Identification orchestration tests
mod identification_test;

// Result cache tests
mod history_test;

// Reminder scheduler tests
mod reminders_test;

// Command layer tests against a temporary data directory
mod commands_test;
