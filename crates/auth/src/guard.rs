//! Protected-route guard.

use crate::session::Session;

/// What the router should do with a request for a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Silent redirect; the original path rides along so login can
    /// return the visitor where they were headed.
    RedirectToLogin { login_url: String },
}

/// Gate a protected route. Unauthenticated visitors are sent to login
/// with the requested path (query included) as the return target.
pub fn guard(session: &Session, path: &str) -> RouteDecision {
    if session.is_authenticated() {
        return RouteDecision::Allow;
    }

    let redirect: String = url::form_urlencoded::byte_serialize(path.as_bytes()).collect();
    RouteDecision::RedirectToLogin {
        login_url: format!("/login?redirect={redirect}"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use doorstep_storage::MemoryStore;

    use super::*;
    use crate::profile::UserProfile;

    #[test]
    fn unauthenticated_visitor_is_redirected_with_return_path() {
        let session = Session::new(Arc::new(MemoryStore::new()));

        let decision = guard(&session, "/book?serviceId=s1");
        assert_eq!(
            decision,
            RouteDecision::RedirectToLogin {
                login_url: "/login?redirect=%2Fbook%3FserviceId%3Ds1".to_owned()
            }
        );
    }

    #[test]
    fn authenticated_visitor_passes() {
        let session = Session::new(Arc::new(MemoryStore::new()));
        session.store_token("tok");
        session.store_profile(&UserProfile::default());

        assert_eq!(guard(&session, "/checkout"), RouteDecision::Allow);
    }
}
