//! Browser UI routes (HTML pages with inline JS)
//!
//! The pages are thin shells over the JSON API: all report state
//! lives server-side in the session workflow, the browser only
//! renders it.

pub mod login;
pub mod report;
pub mod root;

use axum::{routing::get, Router};

use crate::AppState;

/// Shared stylesheet fragment embedded in every page
pub(crate) const SHARED_STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    background-color: #f4f7f4;
    color: #333;
    line-height: 1.6;
}
nav {
    background-color: #fff;
    border-bottom: 2px solid #e0e8e0;
    padding: 0 24px;
    display: flex;
    gap: 8px;
}
nav a {
    display: inline-block;
    padding: 14px 16px;
    color: #667;
    text-decoration: none;
    font-size: 14px;
    border-bottom: 2px solid transparent;
    margin-bottom: -2px;
}
nav a.active { color: #2e8b57; border-bottom-color: #2e8b57; }
.container { max-width: 900px; margin: 0 auto; padding: 32px 16px; }
h1 { font-size: 26px; margin-bottom: 20px; color: #234; }
.card {
    background: #fff;
    border-radius: 12px;
    box-shadow: 0 1px 4px rgba(0,0,0,0.08);
    padding: 24px;
    margin-bottom: 24px;
}
button {
    width: 100%;
    padding: 12px;
    font-size: 16px;
    border: none;
    border-radius: 8px;
    color: #fff;
    background-color: #2e8b57;
    cursor: pointer;
}
button:disabled { background-color: #9bc4ab; cursor: not-allowed; }
input, select {
    width: 100%;
    padding: 10px;
    border: 1px solid #ccd;
    border-radius: 8px;
    font-size: 14px;
}
input[readonly] { background-color: #eef2ee; }
label { display: block; font-size: 13px; color: #556; margin-bottom: 4px; }
#toast {
    position: fixed;
    top: 16px;
    right: 16px;
    padding: 12px 18px;
    border-radius: 8px;
    color: #fff;
    display: none;
    z-index: 10;
}
#toast.ok { background-color: #2e8b57; }
#toast.err { background-color: #c0392b; }
"#;

/// Navigation bar markup shared by every page
pub(crate) const NAV_BAR: &str = r#"
<nav>
  <a href="/" id="nav-home">Home</a>
  <a href="/report" id="nav-report">Report Waste</a>
  <a href="/collect">Collect Waste</a>
  <a href="/rewards">Rewards</a>
  <a href="/leaderboard">Leaderboard</a>
</nav>
"#;

/// Toast helper embedded in every page's script
pub(crate) const TOAST_SCRIPT: &str = r#"
function toast(message, ok) {
  const el = document.getElementById('toast');
  el.textContent = message;
  el.className = ok ? 'ok' : 'err';
  el.style.display = 'block';
  setTimeout(() => { el.style.display = 'none'; }, 4000);
}
"#;

/// Assemble a full page from its body markup and script. Keeps the
/// page constants free of format-string escaping.
pub(crate) fn page(title: &str, body: &str, script: &str) -> String {
    format!(
        concat!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n",
            "<meta charset=\"UTF-8\">\n",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
            "<title>{title}</title>\n<style>{style}</style>\n</head>\n<body>\n",
            "{nav}\n{body}\n<div id=\"toast\"></div>\n",
            "<script>\n{toast}\n{script}\n</script>\n</body>\n</html>\n"
        ),
        title = title,
        style = SHARED_STYLE,
        nav = NAV_BAR,
        body = body,
        toast = TOAST_SCRIPT,
        script = script,
    )
}

/// Build UI routes
pub fn ui_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root::home_page))
        .route("/report", get(report::report_page))
        .route("/login", get(login::login_page))
}
