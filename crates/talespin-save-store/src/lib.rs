//! Talespin — save slot persistence.

pub mod file_save_repository;
pub mod layout;
