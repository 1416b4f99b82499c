pub mod dto;
pub mod platform;
pub mod servers;
