pub mod builders;
pub mod interactive;
pub mod services;
