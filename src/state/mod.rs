pub mod navigation;
pub mod session;

pub use navigation::NavigationStore;
pub use session::Session;
