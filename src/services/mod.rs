pub mod concat;
pub mod delivery;
pub mod intake;
pub mod manifest;
pub mod scratch;
pub mod stitch_service;
