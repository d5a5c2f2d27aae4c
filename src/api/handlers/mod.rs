pub mod health;
pub mod stitch;
