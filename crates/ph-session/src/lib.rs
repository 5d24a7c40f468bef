//! Registry of live tables: on-demand hydration from persistence, per-table
//! chat and subscriber fan-out with hole-card masking, turn-timeout sweep,
//! auto-progression/auto-start, and stack/session/history persistence.

mod chat;
mod registry;
mod service;
mod sweep;
mod view;

pub use chat::{ChatLog, ChatMessage};
pub use registry::{ChannelId, Registry, TableHandle};
pub use service::SessionService;
pub use sweep::sweep_table;
pub use view::{masked_view, Frame, SeatView, TableView};
