//! Translation of plainchant posts, threads and catalogs into the
//! 4chan-style public JSON API (`no`, `resto`, `com`, `sub`, ...).

pub mod api;
pub mod config;
pub mod format;
pub mod modifiers;
pub mod posterid;
pub mod site;
pub mod util;

pub use api::{Api, ApiCatalogPage, ApiPage, ApiPost, ApiThread, Mode};
pub use config::Config;
pub use util::{ApiErr, ErrOrigin};
