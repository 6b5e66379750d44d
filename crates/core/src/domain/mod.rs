//! Domain entities and business rules

pub mod binding;
pub mod codec;
pub mod columns;
pub mod config;
pub mod session;
pub mod target;

// Re-export specific items to avoid ambiguous glob imports
pub use binding::{BindingChange, BindingEntry, BindingError, BindingStore, Fader, Layer};
pub use codec::{truncated_name, CodecError, ConfigCodec, ParsedConfig, UNRESOLVED_NAME};
pub use columns::{ColumnError, ColumnList};
pub use config::{ConfigError, ConfigManager, DiscoveryConfig, LayerConfig, VolmixConfig};
pub use session::{ImportSummary, LayerGrid, Session, SessionError};
pub use target::{
    Category, DiscoveryError, NameResolver, NoTargets, Target, TargetDirectory, TargetDiscovery,
    TargetId,
};
