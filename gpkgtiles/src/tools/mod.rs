pub mod create;
pub mod export;
pub mod import;
pub mod info;
pub mod verify;
