pub mod injector;
pub mod loader;
