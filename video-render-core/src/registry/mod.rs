pub mod factory;
pub mod handle;
pub mod renderer_registry;
