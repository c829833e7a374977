//! # Tablefilter Architecture
//!
//! Tablefilter is a **UI-agnostic filtering core for tables**. A front end
//! shows one editor per column; the user picks or types a value, and the rows
//! that do not match disappear. This crate owns everything behind that editor
//! row except the painting.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Host (a GUI, or the tablefilter CLI)                       │
//! │  - Owns the data (TableModel) and the row view (RowView)    │
//! │  - Forwards data events, calls run_deferred() afterwards    │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Coordinator (coordinator/)                                 │
//! │  - One FilterEditor per column, AND-composed                │
//! │  - Batches changes, re-applies the filter once per batch    │
//! └─────────────────────────────────────────────────────────────┘
//!               │                               │
//!               ▼                               ▼
//! ┌───────────────────────────┐   ┌───────────────────────────────┐
//! │  Filters (filter/)        │   │  Choices (extract/, choice/)  │
//! │  - Observable predicates  │   │  - Live candidate values      │
//! │  - And / Or / Not         │   │  - History, prefix matching   │
//! └───────────────────────────┘   └───────────────────────────────┘
//! ```
//!
//! ## Key Principle: Single-Threaded and Synchronous
//!
//! All state lives behind `Rc`/`RefCell`. Notifications are delivered
//! synchronously, in registration order, and may re-enter the coordinator, so
//! no component holds a `RefCell` borrow while notifying.
//!
//! ## Module Overview
//!
//! - [`filter`]: the [`Filter`] trait, leaf and composite filters.
//! - [`coordinator`]: [`FilterCoordinator`] and [`NotificationGuard`].
//! - [`extract`]: non-adaptive and adaptive choice extraction.
//! - [`choice`]: choices, choice sets, longest-prefix matching.
//! - [`history`]: bounded, one-step-lagging input history.
//! - [`editor`]: per-column editor state and auto-choice modes.
//! - [`model`] / [`view`]: the data and view boundaries, with in-memory
//!   implementations.
//! - [`settings`]: [`FilterSettings`], loaded with `confique`.

pub mod choice;
pub mod coordinator;
pub mod editor;
pub mod error;
pub mod extract;
pub mod filter;
pub mod history;
pub mod model;
pub mod settings;
pub mod value;
pub mod view;

pub use choice::{Choice, ChoiceMatch, ChoiceSet, CustomChoice, TextComparison};
pub use coordinator::{FilterCoordinator, HeaderObserver, NotificationGuard};
pub use editor::{AutoChoices, EditorConfig, FilterEditor};
pub use error::{FilterError, Result};
pub use filter::{Filter, FilterRef};
pub use history::HistoryList;
pub use model::{MemTable, TableEvent, TableModel};
pub use settings::FilterSettings;
pub use value::{ColumnType, Value};
pub use view::{MemView, RowView};
