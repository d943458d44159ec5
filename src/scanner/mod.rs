pub mod crawler;
pub mod fingerprint;
pub mod links;
pub mod params;
pub mod sitemap;
