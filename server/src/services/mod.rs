pub mod composer;
pub mod geocoder;
pub mod home;
pub mod renderer;
