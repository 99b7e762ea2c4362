//! Pieces shared by more than one page.

mod brand;
pub use brand::Brand;

mod loading_screen;
pub use loading_screen::LoadingScreen;
