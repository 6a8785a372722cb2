pub mod amount;
pub mod asset_type;
