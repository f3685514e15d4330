pub use super::component_cache::Entity as ComponentCache;
