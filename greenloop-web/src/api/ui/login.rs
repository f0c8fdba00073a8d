//! Login page: captures the email into browser local storage
//!
//! There is no password flow here; the stored email is the whole
//! identity token, and its absence is the logged-out state.

use axum::response::{Html, IntoResponse};

const BODY: &str = r#"
<div class="container" style="max-width:420px;">
  <div class="card">
    <h1>Log in</h1>
    <form id="login-form">
      <label for="email">Email</label>
      <input type="email" id="email" placeholder="you@example.com" required>
      <button type="submit" style="margin-top:16px;">Continue</button>
    </form>
  </div>
</div>
"#;

const SCRIPT: &str = r#"
document.getElementById('login-form').addEventListener('submit', (e) => {
  e.preventDefault();
  const email = document.getElementById('email').value.trim();
  if (!email) {
    toast('Please enter an email address', false);
    return;
  }
  localStorage.setItem('userEmail', email);
  window.location.href = '/report';
});
"#;

/// GET /login
pub async fn login_page() -> impl IntoResponse {
    Html(super::page("GreenLoop - Log in", BODY, SCRIPT))
}
