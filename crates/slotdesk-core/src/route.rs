use crate::types::Collection;

pub const LOGIN_PATH: &str = "/auth";

/// Every page the application knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Auth,
    Home,
    GitReplace,
    SalesWorkflows,
    ReplitToVercel,
    LovablePrompts,
    FlutterWebview,
    OdooHosting,
    NotFound,
}

impl Route {
    /// Routes that need a session, in menu order.
    pub const GUARDED: [Route; 7] = [
        Route::Home,
        Route::GitReplace,
        Route::SalesWorkflows,
        Route::ReplitToVercel,
        Route::LovablePrompts,
        Route::FlutterWebview,
        Route::OdooHosting,
    ];

    /// Exact-match a request path. Unknown paths map to `NotFound`.
    pub fn resolve(path: &str) -> Route {
        match path {
            LOGIN_PATH => Route::Auth,
            "/" => Route::Home,
            "/git-replace" => Route::GitReplace,
            "/sales-workflows" => Route::SalesWorkflows,
            "/replit-to-vercel" => Route::ReplitToVercel,
            "/lovable-prompts" => Route::LovablePrompts,
            "/flutter-webview" => Route::FlutterWebview,
            "/odoo-hosting" => Route::OdooHosting,
            _ => Route::NotFound,
        }
    }

    /// The route a request path belongs to: an exact page path, or the
    /// page named by the slug in `/pages/{slug}/...`.
    pub fn owning(path: &str) -> Route {
        match path.strip_prefix("/pages/") {
            Some(rest) => rest
                .split('/')
                .next()
                .and_then(Route::from_slug)
                .unwrap_or(Route::NotFound),
            None => Route::resolve(path),
        }
    }

    pub fn path(self) -> Option<&'static str> {
        match self {
            Route::Auth => Some(LOGIN_PATH),
            Route::Home => Some("/"),
            Route::GitReplace => Some("/git-replace"),
            Route::SalesWorkflows => Some("/sales-workflows"),
            Route::ReplitToVercel => Some("/replit-to-vercel"),
            Route::LovablePrompts => Some("/lovable-prompts"),
            Route::FlutterWebview => Some("/flutter-webview"),
            Route::OdooHosting => Some("/odoo-hosting"),
            Route::NotFound => None,
        }
    }

    /// Path without the leading slash; `None` for routes that are not pages.
    pub fn slug(self) -> Option<&'static str> {
        match self {
            Route::Home | Route::Auth | Route::NotFound => None,
            other => other.path().map(|p| p.trim_start_matches('/')),
        }
    }

    pub fn from_slug(slug: &str) -> Option<Route> {
        Route::GUARDED
            .into_iter()
            .find(|r| r.slug() == Some(slug))
    }

    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Auth | Route::NotFound)
    }

    /// Editor pages persist into a collection.
    pub fn collection(self) -> Option<Collection> {
        match self {
            Route::FlutterWebview => Some(Collection::FlutterWebviewConfigs),
            Route::LovablePrompts => Some(Collection::LovablePrompts),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Route::Auth => "Sign in",
            Route::Home => "Home",
            Route::GitReplace => "Git Replace Command",
            Route::SalesWorkflows => "Sales Workflows",
            Route::ReplitToVercel => "Replit Made to Vercel Ready",
            Route::LovablePrompts => "Lovable Prompts",
            Route::FlutterWebview => "Flutter Web View App",
            Route::OdooHosting => "Odoo Hosting",
            Route::NotFound => "Page not found",
        }
    }

    pub fn summary(self) -> &'static str {
        match self {
            Route::Auth => "Sign in to reach your saved configs and prompts.",
            Route::Home => "Reference pages and saved snippets for day-to-day workflows.",
            Route::GitReplace => "Commands for replacing a repository's history and remote.",
            Route::SalesWorkflows => "Notes for running the sales pipeline.",
            Route::ReplitToVercel => "Steps to make a Replit project deployable on Vercel.",
            Route::LovablePrompts => "Twenty saved prompts, each with its own label.",
            Route::FlutterWebview => "Twenty saved configurations for the Flutter web view app.",
            Route::OdooHosting => "Guide for hosting an Odoo instance.",
            Route::NotFound => "Nothing lives at this address.",
        }
    }
}
