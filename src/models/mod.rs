pub mod account;
pub mod addon;
pub mod saved_addon;

pub use account::{Account, AccountExport, ApiKey, ApiKeyInput, ApiKeyUpdate, ExportedAccount};
pub use addon::{AddonDescriptor, AddonFlags, AddonManifest, BehaviorHints};
pub use saved_addon::{
    AddedAddon, AddonHealth, MergeResult, MergeStrategy, ProtectedAddon, SavedAddon,
    SavedAddonExport, SkipReason, SkippedAddon, UpdatedAddon,
};
