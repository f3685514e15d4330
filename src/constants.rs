pub const KNOWN_SOURCES: &[&str] = &[sources::DIGIKEY, sources::MOUSER];

pub mod sources {

    pub const DIGIKEY: &str = "digikey";

    pub const MOUSER: &str = "mouser";

    pub const DEMO: &str = "demo";

    pub const CACHE: &str = "cache";
}

pub mod cache {

    pub const COMPONENT_TTL_DAYS: i64 = 30;

    pub const MAX_LOOKUP_RESULTS: usize = 10;
}

pub mod limits {

    pub const DEFAULT_LIMIT_PER_SOURCE: u32 = 10;

    pub const MAX_LIMIT_PER_SOURCE: u32 = 50;
}

pub mod pricing {

    /// Sort key for records whose unit price cannot be parsed. Highest
    /// possible so they always rank after every parseable price.
    pub const UNPARSEABLE_SORT_KEY: f64 = f64::INFINITY;
}

pub mod http {

    pub const USER_AGENT: &str = "Bomarr/1.0";

    pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
}
