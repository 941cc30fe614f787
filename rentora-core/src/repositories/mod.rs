// src/repositories/mod.rs

pub mod postgres;

pub use postgres::appointment::PostgresAppointmentRepository;
pub use postgres::coin::PostgresCoinRepository;
pub use postgres::property::PostgresPropertyRepository;
pub use postgres::rental::PostgresRentalRepository;
pub use postgres::user::PostgresUserRepository;
pub use postgres::wallet::PostgresWalletRepository;
