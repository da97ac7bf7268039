//! Agent status notifications for Discord.
//!
//! Formats task-status updates from automated agents as webhook embeds,
//! optionally attaching an avatar from a static image set or the Taiga user
//! directory, and optionally mirroring the status into PostgreSQL.

pub mod avatar;
pub mod cli;
pub mod delivery;
pub mod formatter;
pub mod mirror;
pub mod pipeline;
pub mod registry;
pub mod taiga;
pub mod transport;
