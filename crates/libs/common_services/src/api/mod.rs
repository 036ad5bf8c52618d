pub mod avatar;
pub mod clothes;
pub mod outfits;
pub mod try_on;
pub mod upload;
