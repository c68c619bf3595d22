pub mod account_service;
pub mod account_service_impl;
pub use account_service::{
    AccountError, AccountService, AccountUpdate, BulkDebridResult, ImportSummary,
    ReinstallOutcome, SyncReport,
};
pub use account_service_impl::DefaultAccountService;

pub mod debrid;
pub use debrid::{DebridError, DebridKeyApplier};

pub mod health;
pub use health::{HealthProber, HealthSummary, HttpLivenessProbe, LivenessProbe, health_summary};

pub mod library_service;
pub mod library_service_impl;
pub use library_service::{LibraryError, LibraryService, normalize_tag};
pub use library_service_impl::DefaultLibraryService;

pub mod merge;
pub use merge::{RemovalOutcome, merge, preview_merge};

pub mod updates;
pub use updates::{AddonUpdateInfo, ExecutionPolicy, check_updates};

pub mod vault;
pub use vault::{Vault, VaultError, WipeReport};
