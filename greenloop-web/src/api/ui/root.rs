//! Landing page: community impact cards

use axum::response::{Html, IntoResponse};

const BODY: &str = r#"
<div class="container">
  <div class="card">
    <h1>Our Impact</h1>
    <div style="display:grid;grid-template-columns:repeat(auto-fit,minmax(180px,1fr));gap:16px;">
      <div class="card" style="margin:0;">
        <p id="waste-collected" style="font-size:28px;font-weight:bold;">0 kg</p>
        <p style="font-size:13px;color:#667;">Waste Collected</p>
      </div>
      <div class="card" style="margin:0;">
        <p id="reports-submitted" style="font-size:28px;font-weight:bold;">0</p>
        <p style="font-size:13px;color:#667;">Reports Submitted</p>
      </div>
      <div class="card" style="margin:0;">
        <p id="tokens-earned" style="font-size:28px;font-weight:bold;">0</p>
        <p style="font-size:13px;color:#667;">Tokens Earned</p>
      </div>
      <div class="card" style="margin:0;">
        <p id="co2-offset" style="font-size:28px;font-weight:bold;">0 kg</p>
        <p style="font-size:13px;color:#667;">CO2 Offset</p>
      </div>
    </div>
  </div>
</div>
"#;

const SCRIPT: &str = r#"
document.getElementById('nav-home').classList.add('active');

async function loadImpact() {
  try {
    const res = await fetch('/api/impact');
    if (!res.ok) throw new Error('impact request failed');
    const impact = await res.json();
    document.getElementById('waste-collected').textContent = impact.waste_collected + ' kg';
    document.getElementById('reports-submitted').textContent = impact.reports_submitted;
    document.getElementById('tokens-earned').textContent = impact.tokens_earned;
    document.getElementById('co2-offset').textContent = impact.co2_offset + ' kg';
  } catch (err) {
    console.error('Error fetching impact data:', err);
  }
}
loadImpact();
"#;

/// GET /
pub async fn home_page() -> impl IntoResponse {
    Html(super::page("GreenLoop", BODY, SCRIPT))
}
