pub mod analytics;
pub mod ask;
pub mod home_route;
