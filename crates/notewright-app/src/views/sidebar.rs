use crate::Route;
use crate::components::Brand;
use dioxus::prelude::*;

const SIDEBAR_CSS: Asset = asset!("/assets/styling/sidebar.css");

struct NavItem {
    icon: &'static str,
    label: &'static str,
    route: fn() -> Route,
}

const NAV_ITEMS: &[NavItem] = &[
    NavItem {
        icon: "dashboard",
        label: "Dashboard",
        route: || Route::Dashboard {},
    },
    NavItem {
        icon: "add_circle",
        label: "New Concept",
        route: || Route::Create {},
    },
    NavItem {
        icon: "settings",
        label: "Settings",
        route: || Route::Settings {},
    },
];

/// Layout for every in-app page: navigation on the left, the routed page in
/// the scrolling pane on the right.
#[component]
pub fn Sidebar() -> Element {
    rsx! {
        document::Link { rel: "stylesheet", href: SIDEBAR_CSS }

        div { class: "app-shell",
            aside { class: "sidebar",
                Brand {}
                nav { class: "sidebar-nav",
                    for item in NAV_ITEMS {
                        Link {
                            key: "{item.label}",
                            to: (item.route)(),
                            class: "nav-item",
                            active_class: "nav-item-active",
                            span { class: "material-symbols-outlined", "{item.icon}" }
                            span { "{item.label}" }
                        }
                    }
                }
            }
            header { class: "mobile-header",
                span { class: "material-symbols-outlined", "school" }
                span { class: "mobile-header-name", "Notewright" }
            }
            main { class: "app-main",
                Outlet::<Route> {}
            }
        }
    }
}
