pub mod analytics;
pub mod apps;
pub mod exports;
pub mod links;
pub mod qr;
