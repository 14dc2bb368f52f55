use crate::screens::ScreenId;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Resolution {
    Screen(ScreenId),
    Login,
    Redirect(String),
}

/// Flat path table. `/login` sits outside the authenticated tree; everything
/// else needs a session.
#[derive(Clone, Debug)]
pub struct RouteTable {
    routes: Vec<(String, ScreenId)>,
}

fn normalize(path: &str) -> String {
    let path = path
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim();
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        HOME_PATH.to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: ScreenId::ALL
                .into_iter()
                .map(|id| (id.path().to_string(), id))
                .collect(),
        }
    }

    pub fn lookup(&self, path: &str) -> Option<ScreenId> {
        let path = normalize(path);
        self.routes
            .iter()
            .find(|(candidate, _)| *candidate == path)
            .map(|(_, id)| *id)
    }

    pub fn resolve(&self, path: &str, authenticated: bool) -> Resolution {
        let normalized = normalize(path);
        if normalized == LOGIN_PATH {
            return if authenticated {
                Resolution::Redirect(HOME_PATH.into())
            } else {
                Resolution::Login
            };
        }
        if !authenticated {
            return Resolution::Redirect(LOGIN_PATH.into());
        }
        match self.lookup(&normalized) {
            Some(id) => Resolution::Screen(id),
            None => Resolution::Redirect(HOME_PATH.into()),
        }
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paths_resolve_to_screens() {
        let routes = RouteTable::new();
        assert_eq!(routes.resolve("/orders", true), Resolution::Screen(ScreenId::Orders));
        assert_eq!(routes.resolve("/settings/", true), Resolution::Screen(ScreenId::Settings));
        assert_eq!(
            routes.resolve("/loyalty-program?tab=gold", true),
            Resolution::Screen(ScreenId::Loyalty)
        );
        assert_eq!(routes.resolve("", true), Resolution::Screen(ScreenId::Overview));
    }

    #[test]
    fn unknown_paths_redirect_home() {
        let routes = RouteTable::new();
        assert_eq!(routes.resolve("/does-not-exist", true), Resolution::Redirect("/".into()));
    }

    #[test]
    fn sign_in_boundary() {
        let routes = RouteTable::new();
        assert_eq!(routes.resolve("/orders", false), Resolution::Redirect("/login".into()));
        assert_eq!(routes.resolve("/nowhere", false), Resolution::Redirect("/login".into()));
        assert_eq!(routes.resolve("/login", false), Resolution::Login);
        assert_eq!(routes.resolve("/login", true), Resolution::Redirect("/".into()));
    }
}
