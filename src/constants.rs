pub mod storage {

    pub const ACCOUNTS: &str = "addonvault:accounts";

    pub const ADDON_LIBRARY: &str = "addonvault:addon-library";

    pub const DEVICE_SALT: &str = "addonvault:salt";

    pub const USER_SALT: &str = "addonvault:user-salt";

    pub const PASSWORD_HASH: &str = "addonvault:password-hash";

    /// Every key a full vault wipe has to clear.
    pub const ALL: &[&str] = &[ACCOUNTS, ADDON_LIBRARY, DEVICE_SALT, USER_SALT, PASSWORD_HASH];
}

pub mod crypto {

    /// Passphrase mixed with the per-device salt when no master password is set.
    pub const APP_PASSPHRASE: &str = "addonvault-v1";

    pub const SALT_BYTES: usize = 16;

    pub const MIN_MASTER_PASSWORD_LEN: usize = 8;
}

pub mod export {

    pub const FORMAT_VERSION: &str = "1.0.0";
}

pub mod limits {

    pub const MAX_SAVED_ADDON_NAME: usize = 100;

    pub const MAX_TAG_LEN: usize = 50;

    pub const DEFAULT_HEALTH_CONCURRENCY: usize = 5;
}

pub mod intervals {
    use std::time::Duration;

    pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

    pub const MANIFEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub const API_TIMEOUT: Duration = Duration::from_secs(30);
}
