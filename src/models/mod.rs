pub mod component;

pub use component::{
    Availability, ComponentRecord, LifecycleStatus, PriceBreak, PriceParseError, Pricing,
    parse_price,
};
