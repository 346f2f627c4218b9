use std::fmt;
use std::str::FromStr;

use crate::domain::{can_access, Role, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Questions,
    UserDashboard,
    AdminDashboard,
    AdminTags,
    AdminUsers,
}

impl Route {
    /// Role needed to render the route; `None` means public.
    pub fn required_role(self) -> Option<Role> {
        match self {
            Route::Login | Route::Questions => None,
            Route::UserDashboard => Some(Role::User),
            Route::AdminDashboard | Route::AdminTags | Route::AdminUsers => Some(Role::Admin),
        }
    }

    pub fn dashboard_for(role: Role) -> Self {
        match role {
            Role::User => Route::UserDashboard,
            Role::Admin => Route::AdminDashboard,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Questions => "/questions",
            Route::UserDashboard => "/dashboard",
            Route::AdminDashboard => "/admin",
            Route::AdminTags => "/admin/tags",
            Route::AdminUsers => "/admin/users",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().trim_end_matches('/');
        [
            Route::Login,
            Route::Questions,
            Route::UserDashboard,
            Route::AdminDashboard,
            Route::AdminTags,
            Route::AdminUsers,
        ]
        .into_iter()
        .find(|r| r.path() == normalized || r.path().trim_start_matches('/') == normalized)
        .ok_or_else(|| format!("Unknown route: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect(Route),
}

/// Resolves a navigation request against the current session.
///
/// Anonymous users go to the login page; users of the wrong role land on
/// their own dashboard.
pub fn navigate(session: Option<&Session>, route: Route) -> Navigation {
    let Some(required) = route.required_role() else {
        return Navigation::Render(route);
    };

    if can_access(session, required) {
        return Navigation::Render(route);
    }

    match session {
        Some(s) => Navigation::Redirect(Route::dashboard_for(s.role)),
        None => Navigation::Redirect(Route::Login),
    }
}
