//! Platform integrations for Volmix

pub mod discovery;
