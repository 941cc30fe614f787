// File: rentora-core/tests/unit/main.rs


mod appointment_tests;
mod coin_tests;
mod property_tests;
mod wallet_tests;
