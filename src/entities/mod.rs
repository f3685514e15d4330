pub mod prelude;

pub mod component_cache;
