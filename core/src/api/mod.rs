//! Resource facades. Each module adds the methods of one AppGrid resource to
//! [`AppGridClient`](crate::AppGridClient).

mod app_log;
mod application;
mod assets;
mod entries;
mod events;
mod metadata;
mod plugins;
mod profile;
mod user_data;
