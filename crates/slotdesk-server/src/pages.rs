//! Server-rendered HTML: the navigation shell, the sign-in page, static
//! workflow pages and the slot editor forms.

use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use serde::Deserialize;
use slotdesk_core::clipboard::CapturedClipboard;
use slotdesk_core::editor::SlotView;
use slotdesk_core::nav::{NavEntry, NavShell, NavView};
use slotdesk_core::notify::{Toast, ToastLog};
use slotdesk_core::route::{Route, LOGIN_PATH};
use slotdesk_core::types::SlotIndex;

use crate::auth::{self, CurrentSession, NAV_COOKIE};
use crate::routes::slots::editor_target;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    edit: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    back: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TextForm {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
pub struct LabelForm {
    #[serde(default)]
    label: String,
}

// ---------------------------------------------------------------------------
// Pages
// ---------------------------------------------------------------------------

/// GET for every page path. Editor pages load their slots first; `?edit=N`
/// opens the label editor on slot N.
pub async fn show_page(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<PageQuery>,
) -> Response {
    let route = Route::resolve(uri.path());
    if route == Route::NotFound {
        return not_found_response();
    }
    let nav = nav_shell(&headers);

    let Some(collection) = route.collection() else {
        return Html(static_page(route, &nav, &current)).into_response();
    };

    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    // Failures are logged and reported by the editor itself.
    let _ = editor.load().await;

    let editing = query
        .edit
        .as_deref()
        .and_then(|n| n.parse::<usize>().ok())
        .and_then(|n| SlotIndex::from_number(n).ok());
    if let Some(index) = editing {
        editor.begin_label_edit(index);
    }

    let page = EditorPage {
        route,
        views: editor.views(),
        temp_label: editor.temp_label(),
        copy_text: None,
    };
    Html(page.render(&nav, &current, &log.take())).into_response()
}

pub async fn not_found() -> Response {
    not_found_response()
}

fn not_found_response() -> Response {
    let body = format!(
        "<h1>404</h1><p>{}</p><p><a href=\"/\">Back to home</a></p>",
        escape(Route::NotFound.summary())
    );
    (
        StatusCode::NOT_FOUND,
        Html(layout(Route::NotFound.title(), None, &[], &body, false)),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Sign in / out
// ---------------------------------------------------------------------------

pub async fn login_page(Extension(current): Extension<CurrentSession>) -> Response {
    if current.session().is_some() {
        return auth::redirect("/");
    }
    Html(login_html(&[])).into_response()
}

pub async fn login_submit(State(app): State<AppState>, Form(form): Form<LoginForm>) -> Response {
    match app.sessions.sign_in(&form.username, &form.password).await {
        Ok(session) => {
            let max_age = session.max_age();
            (
                StatusCode::SEE_OTHER,
                [
                    (header::LOCATION, "/".to_string()),
                    (header::SET_COOKIE, auth::session_cookie(&session.token, max_age)),
                ],
            )
                .into_response()
        }
        Err(e) => {
            tracing::info!(username = %form.username, error = %e, "sign-in rejected");
            let toast = Toast::error("Sign in failed", e.to_string());
            (StatusCode::UNAUTHORIZED, Html(login_html(&[toast]))).into_response()
        }
    }
}

/// Sign out, then land on the sign-in page. A surfaced sign-out failure is
/// shown there instead of redirecting.
pub async fn logout(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
) -> Response {
    let log = ToastLog::new();
    let token = current.token();
    let target =
        NavShell::logout(&app.sessions, token.as_ref(), &log, app.config.errors.logout).await;
    let clear = auth::clear_session_cookie();

    let toasts = log.take();
    if toasts.is_empty() {
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, target.to_string()), (header::SET_COOKIE, clear)],
        )
            .into_response()
    } else {
        ([(header::SET_COOKIE, clear)], Html(login_html(&toasts))).into_response()
    }
}

pub async fn toggle_nav(headers: HeaderMap, Form(form): Form<ToggleForm>) -> Response {
    let mut shell = nav_shell(&headers);
    shell.toggle();
    let cookie = format!(
        "{NAV_COOKIE}={}; SameSite=Lax; Path=/",
        if shell.is_expanded() { "1" } else { "0" }
    );
    let back = form
        .back
        .filter(|b| is_local_path(b))
        .unwrap_or_else(|| "/".to_string());
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, back), (header::SET_COOKIE, cookie)],
    )
        .into_response()
}

/// Same-origin absolute path. Browsers read a backslash as `/` and drop
/// tabs and newlines, so `/\host` also names another origin.
fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
}

// ---------------------------------------------------------------------------
// Editor forms
// ---------------------------------------------------------------------------

pub async fn save_slot(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    Path((page, number)): Path<(String, usize)>,
    Form(form): Form<TextForm>,
) -> Response {
    let Ok((route, collection, index)) = editor_target(&page, number) else {
        return not_found_response();
    };
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let _ = editor.load().await;
    editor.edit_text(index, form.text);
    let _ = editor.save_text(index).await;

    let page = EditorPage {
        route,
        views: editor.views(),
        temp_label: editor.temp_label(),
        copy_text: None,
    };
    Html(page.render(&nav_shell(&headers), &current, &log.take())).into_response()
}

pub async fn label_slot(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    Path((page, number)): Path<(String, usize)>,
    Form(form): Form<LabelForm>,
) -> Response {
    let Ok((route, collection, index)) = editor_target(&page, number) else {
        return not_found_response();
    };
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let _ = editor.load().await;
    editor.begin_label_edit(index);
    editor.set_temp_label(form.label);
    let _ = editor.save_label(index).await;

    let page = EditorPage {
        route,
        views: editor.views(),
        temp_label: editor.temp_label(),
        copy_text: None,
    };
    Html(page.render(&nav_shell(&headers), &current, &log.take())).into_response()
}

/// The browser performs the actual clipboard write from the rendered page.
pub async fn copy_slot(
    State(app): State<AppState>,
    Extension(current): Extension<CurrentSession>,
    headers: HeaderMap,
    Path((page, number)): Path<(String, usize)>,
    Form(form): Form<TextForm>,
) -> Response {
    let Ok((route, collection, index)) = editor_target(&page, number) else {
        return not_found_response();
    };
    let log = ToastLog::new();
    let mut editor = app.editor(collection, current.token(), &log);
    let _ = editor.load().await;
    editor.edit_text(index, form.text);
    let mut clipboard = CapturedClipboard::new();
    let _ = editor.copy(index, &mut clipboard);

    let page = EditorPage {
        route,
        views: editor.views(),
        temp_label: editor.temp_label(),
        copy_text: clipboard.last(),
    };
    Html(page.render(&nav_shell(&headers), &current, &log.take())).into_response()
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn nav_shell(headers: &HeaderMap) -> NavShell {
    NavShell::new(auth::read_cookie(headers, NAV_COOKIE).as_deref() == Some("1"))
}

struct EditorPage<'a> {
    route: Route,
    views: Vec<SlotView>,
    temp_label: &'a str,
    copy_text: Option<&'a str>,
}

impl EditorPage<'_> {
    fn render(&self, nav: &NavShell, current: &CurrentSession, toasts: &[Toast]) -> String {
        let location = self.route.path().unwrap_or("/");
        let slug = self.route.slug().unwrap_or_default();
        let action_base = format!("/pages/{slug}/slots");

        let mut body = format!(
            "<h1>{}</h1><p class=\"summary\">{}</p><div class=\"slots\">",
            escape(self.route.title()),
            escape(self.route.summary())
        );
        for view in &self.views {
            body.push_str(&self.slot_html(view, location, &action_base));
        }
        body.push_str("</div>");
        if let Some(text) = self.copy_text {
            body.push_str(&format!(
                "<div data-copy=\"{}\" hidden></div>",
                escape(text)
            ));
        }

        let nav_html = nav_html(&nav.render(location, current.session()), location);
        layout(self.route.title(), Some(&nav_html), toasts, &body, true)
    }

    fn slot_html(&self, view: &SlotView, location: &str, action_base: &str) -> String {
        let n = view.number;
        let header = if view.editing_label {
            format!(
                "<form class=\"label-form\" method=\"post\" action=\"{action_base}/{n}/label\">\
                 <input name=\"label\" value=\"{}\" autofocus>\
                 <button type=\"submit\">Save</button>\
                 <a href=\"{location}#slot-{n}\">Cancel</a></form>",
                escape(self.temp_label)
            )
        } else {
            format!(
                "<h2>{}</h2><a class=\"edit-label\" href=\"{location}?edit={n}#slot-{n}\">Edit label</a>",
                escape(&view.display_label)
            )
        };

        let mut badges = String::new();
        if view.saving {
            badges.push_str("<span class=\"badge\">Saving</span>");
        }
        if view.saved {
            badges.push_str("<span class=\"badge saved\">Saved</span>");
        }

        format!(
            "<section class=\"slot\" id=\"slot-{n}\"><header>{header}{badges}</header>\
             <form method=\"post\" action=\"{action_base}/{n}/save\">\
             <textarea name=\"text\" rows=\"6\">{}</textarea>\
             <div class=\"actions\"><button type=\"submit\">Save</button>\
             <button type=\"submit\" formaction=\"{action_base}/{n}/copy\">{}</button></div>\
             </form></section>",
            escape(&view.text),
            if view.copied { "Copied" } else { "Copy" }
        )
    }
}

fn static_page(route: Route, nav: &NavShell, current: &CurrentSession) -> String {
    let location = route.path().unwrap_or("/");
    let mut body = format!(
        "<h1>{}</h1><p class=\"summary\">{}</p>",
        escape(route.title()),
        escape(route.summary())
    );
    if route == Route::Home {
        body.push_str("<ul class=\"cards\">");
        for page in Route::GUARDED.into_iter().filter(|r| *r != Route::Home) {
            body.push_str(&format!(
                "<li><a href=\"{}\"><strong>{}</strong><span>{}</span></a></li>",
                page.path().unwrap_or("/"),
                escape(page.title()),
                escape(page.summary())
            ));
        }
        body.push_str("</ul>");
    }
    let nav_html = nav_html(&nav.render(location, current.session()), location);
    layout(route.title(), Some(&nav_html), &[], &body, true)
}

fn login_html(toasts: &[Toast]) -> String {
    let body = format!(
        "<h1>{}</h1><p class=\"summary\">{}</p>\
         <form class=\"login\" method=\"post\" action=\"{LOGIN_PATH}\">\
         <label>Username <input name=\"username\" autocomplete=\"username\" required></label>\
         <label>Password <input name=\"password\" type=\"password\" autocomplete=\"current-password\" required></label>\
         <button type=\"submit\">Sign in</button></form>",
        escape(Route::Auth.title()),
        escape(Route::Auth.summary())
    );
    layout(Route::Auth.title(), None, toasts, &body, false)
}

fn nav_html(view: &NavView, location: &str) -> String {
    let mut out = String::from("<nav><ul>");
    for entry in &view.items {
        out.push_str(&nav_entry_html(entry, location));
    }
    out.push_str("</ul>");
    if view.show_logout {
        out.push_str(
            "<form method=\"post\" action=\"/logout\"><button type=\"submit\">Log out</button></form>",
        );
    }
    out.push_str("</nav>");
    out
}

fn nav_entry_html(entry: &NavEntry, location: &str) -> String {
    let class = if entry.active { " class=\"active\"" } else { "" };
    if entry.expandable {
        let mut children = String::new();
        for child in &entry.children {
            children.push_str(&nav_entry_html(child, location));
        }
        return format!(
            "<li{class}><form method=\"post\" action=\"/nav/toggle\">\
             <input type=\"hidden\" name=\"back\" value=\"{}\">\
             <button type=\"submit\" aria-expanded=\"{}\">{}</button></form><ul>{children}</ul></li>",
            escape(location),
            entry.expanded,
            escape(entry.title)
        );
    }
    match entry.path {
        Some(path) => format!(
            "<li{class}><a href=\"{path}\">{}</a></li>",
            escape(entry.title)
        ),
        None => format!("<li><span class=\"muted\">{}</span></li>", escape(entry.title)),
    }
}

fn toasts_html(toasts: &[Toast]) -> String {
    if toasts.is_empty() {
        return String::new();
    }
    let mut out = String::from("<div class=\"toasts\" role=\"status\">");
    for toast in toasts {
        let class = if toast.is_error() { "toast destructive" } else { "toast" };
        out.push_str(&format!(
            "<div class=\"{class}\"><strong>{}</strong><p>{}</p></div>",
            escape(&toast.title),
            escape(&toast.description)
        ));
    }
    out.push_str("</div>");
    out
}

/// `guarded` pages open the auth event stream so a sign-out elsewhere
/// navigates them to the sign-in page.
/// Guarded pages start in the `pending` session state: the spinner shows and
/// the page stays hidden until app.js hears from `/api/events`.
const SESSION_PLACEHOLDER: &str = "<div class=\"session-loading\" role=\"status\" \
     aria-live=\"polite\"><span class=\"spinner\"></span>Checking your session…</div>\
     <noscript><style>body[data-session=pending] .session-loading{display:none}\
     body[data-session=pending] nav,body[data-session=pending] main{visibility:visible}\
     </style></noscript>";

fn layout(title: &str, nav: Option<&str>, toasts: &[Toast], body: &str, guarded: bool) -> String {
    let (session, placeholder) = if guarded {
        ("pending", SESSION_PLACEHOLDER)
    } else {
        ("none", "")
    };
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{} · slotdesk</title>\
         <link rel=\"stylesheet\" href=\"/assets/style.css\">\
         <script src=\"/assets/app.js\" defer></script></head>\
         <body data-guarded=\"{guarded}\" data-session=\"{session}\">{placeholder}{}\
         <main>{}{body}</main></body></html>",
        escape(title),
        nav.unwrap_or_default(),
        toasts_html(toasts)
    )
}

pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
