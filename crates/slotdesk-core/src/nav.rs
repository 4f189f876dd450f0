//! Navigation shell: the fixed menu, active highlighting, and logout.

use crate::context::SessionContext;
use crate::notify::{ErrorPolicy, Notifier, Toast};
use crate::route::{Route, LOGIN_PATH};
use crate::session::{Session, SessionStore};
use crate::types::SessionToken;
use serde::Serialize;

#[derive(Debug)]
pub struct MenuItem {
    pub title: &'static str,
    /// `None` for entries without a page.
    pub route: Option<Route>,
    pub children: &'static [MenuItem],
}

const TECH_WORKFLOWS: &[MenuItem] = &[
    MenuItem {
        title: "Lovable Prompts",
        route: Some(Route::LovablePrompts),
        children: &[],
    },
    MenuItem {
        title: "Flutter Web View App",
        route: Some(Route::FlutterWebview),
        children: &[],
    },
    MenuItem {
        title: "Odoo Hosting",
        route: Some(Route::OdooHosting),
        children: &[],
    },
    MenuItem {
        title: "Replit Made to Vercel Ready",
        route: Some(Route::ReplitToVercel),
        children: &[],
    },
];

pub const MENU: &[MenuItem] = &[
    MenuItem {
        title: "Home",
        route: Some(Route::Home),
        children: &[],
    },
    MenuItem {
        title: "Git Replace Command",
        route: Some(Route::GitReplace),
        children: &[],
    },
    MenuItem {
        title: "Sales Workflows",
        route: Some(Route::SalesWorkflows),
        children: &[],
    },
    MenuItem {
        title: "Tech Workflows",
        route: None,
        children: TECH_WORKFLOWS,
    },
    MenuItem {
        title: "Add-hocs Workflows",
        route: None,
        children: &[],
    },
];

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub title: &'static str,
    pub path: Option<&'static str>,
    pub active: bool,
    pub expandable: bool,
    pub expanded: bool,
    /// Empty while the group is collapsed.
    pub children: Vec<NavEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavView {
    pub items: Vec<NavEntry>,
    pub show_logout: bool,
}

// ---------------------------------------------------------------------------
// NavShell
// ---------------------------------------------------------------------------

/// Group expansion is local toggle state. Navigating into a child route
/// does not expand its group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavShell {
    expanded: bool,
}

impl NavShell {
    pub fn new(expanded: bool) -> Self {
        Self { expanded }
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn toggle(&mut self) {
        self.expanded = !self.expanded;
    }

    pub fn render(&self, location: &str, session: Option<&Session>) -> NavView {
        let items = MENU
            .iter()
            .map(|item| self.entry(item, location))
            .collect();
        NavView {
            items,
            show_logout: session.is_some(),
        }
    }

    fn entry(&self, item: &MenuItem, location: &str) -> NavEntry {
        let path = item.route.and_then(Route::path);
        let expandable = !item.children.is_empty();
        let active = if expandable {
            item.children
                .iter()
                .any(|c| c.route.and_then(Route::path) == Some(location))
        } else {
            path == Some(location)
        };
        let children = if expandable && self.expanded {
            item.children
                .iter()
                .map(|c| self.entry(c, location))
                .collect()
        } else {
            Vec::new()
        };
        NavEntry {
            title: item.title,
            path,
            active,
            expandable,
            expanded: expandable && self.expanded,
            children,
        }
    }

    /// Sign out, then navigate to the login page whatever the outcome.
    /// Sign-out failures are logged and reported according to `policy`.
    pub async fn logout<S: SessionStore>(
        context: &SessionContext<S>,
        token: Option<&SessionToken>,
        notifier: &impl Notifier,
        policy: ErrorPolicy,
    ) -> &'static str {
        if let Some(token) = token {
            if let Err(e) = context.sign_out(token).await {
                tracing::warn!(error = %e, "sign-out failed");
                policy.report(notifier, Toast::error("Error signing out", e.to_string()));
            }
        }
        LOGIN_PATH
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, SlotError};
    use crate::notify::ToastLog;
    use crate::session::tests::store_with;
    use crate::session::AuthEvent;
    use tokio::sync::broadcast;

    fn find<'a>(view: &'a NavView, title: &str) -> &'a NavEntry {
        view.items.iter().find(|e| e.title == title).unwrap()
    }

    #[test]
    fn highlights_matching_item() {
        let view = NavShell::default().render("/git-replace", None);
        assert!(find(&view, "Git Replace Command").active);
        assert!(!find(&view, "Home").active);
    }

    #[test]
    fn group_active_for_child_route_but_stays_collapsed() {
        let view = NavShell::default().render("/flutter-webview", None);
        let group = find(&view, "Tech Workflows");
        assert!(group.active);
        assert!(!group.expanded);
        assert!(group.children.is_empty());
    }

    #[test]
    fn toggle_expands_group_and_marks_child() {
        let mut shell = NavShell::default();
        shell.toggle();
        let view = shell.render("/odoo-hosting", None);
        let group = find(&view, "Tech Workflows");
        assert!(group.expanded);
        assert_eq!(group.children.len(), 4);
        let odoo = group.children.iter().find(|c| c.title == "Odoo Hosting").unwrap();
        assert!(odoo.active);
        assert_eq!(odoo.path, Some("/odoo-hosting"));

        shell.toggle();
        assert!(!shell.is_expanded());
    }

    #[test]
    fn entry_without_route_is_never_active() {
        let view = NavShell::default().render("/", None);
        let adhoc = find(&view, "Add-hocs Workflows");
        assert_eq!(adhoc.path, None);
        assert!(!adhoc.active);
        assert!(find(&view, "Home").active);
    }

    #[tokio::test]
    async fn logout_only_shown_with_session() {
        let ctx = SessionContext::new(store_with("ada", "pw"));
        let session = ctx.sign_in("ada", "pw").await.unwrap();
        assert!(NavShell::default().render("/", Some(&session)).show_logout);
        assert!(!NavShell::default().render("/", None).show_logout);
    }

    #[tokio::test]
    async fn logout_signs_out_and_redirects() {
        let ctx = SessionContext::new(store_with("ada", "pw"));
        let session = ctx.sign_in("ada", "pw").await.unwrap();
        let log = ToastLog::new();
        let target =
            NavShell::logout(&ctx, Some(&session.token), &log, ErrorPolicy::Silent).await;
        assert_eq!(target, "/auth");
        assert_eq!(ctx.current(&session.token).await.unwrap(), None);
        assert!(log.snapshot().is_empty());
    }

    struct FailingSignOut {
        events: broadcast::Sender<AuthEvent>,
    }

    impl SessionStore for FailingSignOut {
        async fn sign_in(&self, _: &str, _: &str) -> Result<Session> {
            Err(SlotError::InvalidCredentials)
        }
        async fn current(&self, _: &SessionToken) -> Result<Option<Session>> {
            Ok(None)
        }
        async fn sign_out(&self, _: &SessionToken) -> Result<()> {
            Err(SlotError::Session("network unreachable".into()))
        }
        fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
            self.events.subscribe()
        }
    }

    #[tokio::test]
    async fn failed_sign_out_still_redirects_silently() {
        let (events, _) = broadcast::channel(4);
        let ctx = SessionContext::new(FailingSignOut { events });
        let log = ToastLog::new();
        let token = SessionToken::new("t");
        let target = NavShell::logout(&ctx, Some(&token), &log, ErrorPolicy::Silent).await;
        assert_eq!(target, "/auth");
        assert!(log.snapshot().is_empty());
    }

    #[tokio::test]
    async fn failed_sign_out_surfaces_when_configured() {
        let (events, _) = broadcast::channel(4);
        let ctx = SessionContext::new(FailingSignOut { events });
        let log = ToastLog::new();
        let token = SessionToken::new("t");
        let target = NavShell::logout(&ctx, Some(&token), &log, ErrorPolicy::Surface).await;
        assert_eq!(target, "/auth");
        let toasts = log.take();
        assert_eq!(toasts.len(), 1);
        assert!(toasts[0].description.contains("network unreachable"));
    }
}
