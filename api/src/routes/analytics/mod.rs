pub mod analytics_response;
pub mod analytics_route;
