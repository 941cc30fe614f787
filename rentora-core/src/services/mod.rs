// src/services/mod.rs

pub mod appointment_service;
pub mod coin_service;
pub mod property_service;
pub mod rental_service;
pub mod wallet_service;

pub use appointment_service::AppointmentService;
pub use coin_service::CoinService;
pub use property_service::PropertyService;
pub use rental_service::RentalService;
pub use wallet_service::WalletService;
