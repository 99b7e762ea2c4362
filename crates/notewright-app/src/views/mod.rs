//! One component per route, plus the [`Sidebar`] layout that wraps the
//! in-app pages. [`NotFound`] sits outside the layout.

mod sidebar;
pub use sidebar::Sidebar;

mod dashboard;
pub use dashboard::Dashboard;

mod create;
pub use create::Create;

mod viewer;
pub use viewer::Viewer;

mod settings;
pub use settings::Settings;

mod not_found;
pub use not_found::NotFound;
