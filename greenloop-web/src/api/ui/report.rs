//! Report page: upload, verify, submit, recent reports

use axum::response::{Html, IntoResponse};

const BODY: &str = r#"
<div class="container">
  <h1>Report waste</h1>

  <div class="card">
    <label for="waste-image">Upload Waste Image</label>
    <input type="file" id="waste-image" accept="image/*">
    <img id="preview" alt="Waste preview" style="display:none;max-width:100%;border-radius:12px;margin-top:12px;">

    <button id="verify-btn" type="button" disabled style="margin-top:16px;background-color:#2b6cb0;">Verify Waste</button>

    <div id="verification-box" style="display:none;background:#edf7ed;border-left:4px solid #2e8b57;padding:12px;margin-top:16px;border-radius:0 8px 8px 0;">
      <strong>Verification Successful</strong>
      <p style="font-size:14px;">Waste Type: <span id="result-type"></span></p>
      <p style="font-size:14px;">Quantity: <span id="result-quantity"></span></p>
      <p style="font-size:14px;">Confidence: <span id="result-confidence"></span></p>
    </div>

    <div style="display:grid;grid-template-columns:1fr 1fr;gap:16px;margin-top:20px;">
      <div style="grid-column:1 / -1;">
        <label for="location">Location</label>
        <div style="display:flex;gap:8px;">
          <input type="text" id="location" placeholder="Enter waste location">
          <button type="button" id="location-search-btn" style="width:auto;padding:10px 16px;">Search</button>
        </div>
      </div>
      <div>
        <label for="type">Waste Type</label>
        <input type="text" id="type" placeholder="Verified waste type" readonly>
      </div>
      <div>
        <label for="amount">Estimated Amount</label>
        <input type="text" id="amount" placeholder="Verified amount" readonly>
      </div>
    </div>

    <button id="submit-btn" type="button" style="margin-top:20px;">Submit Report</button>
  </div>

  <h1>Recent Reports</h1>
  <div class="card" style="padding:0;overflow:hidden;">
    <table style="width:100%;border-collapse:collapse;font-size:14px;">
      <thead>
        <tr style="background:#f0f4f0;text-align:left;">
          <th style="padding:10px 16px;">Location</th>
          <th style="padding:10px 16px;">Type</th>
          <th style="padding:10px 16px;">Amount</th>
          <th style="padding:10px 16px;">Date</th>
        </tr>
      </thead>
      <tbody id="reports-body"></tbody>
    </table>
  </div>
</div>
"#;

const SCRIPT: &str = r#"
document.getElementById('nav-report').classList.add('active');

let sessionId = null;
let verified = false;

const fileInput = document.getElementById('waste-image');
const verifyBtn = document.getElementById('verify-btn');
const submitBtn = document.getElementById('submit-btn');

function addReportRow(report, prepend) {
  const tbody = document.getElementById('reports-body');
  const row = document.createElement('tr');
  for (const value of [report.location, report.waste_type, report.amount, report.created_at]) {
    const cell = document.createElement('td');
    cell.style.padding = '10px 16px';
    cell.textContent = value;
    row.appendChild(cell);
  }
  if (prepend && tbody.firstChild) {
    tbody.insertBefore(row, tbody.firstChild);
  } else {
    tbody.appendChild(row);
  }
}

async function openSession() {
  const email = localStorage.getItem('userEmail');
  if (!email) {
    window.location.href = '/login';
    return;
  }
  const res = await fetch('/api/session', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ email })
  });
  if (!res.ok) {
    toast('Could not resolve your account', false);
    return;
  }
  const session = await res.json();
  sessionId = session.session_id;

  const reports = await fetch('/api/reports/recent').then(r => r.json());
  for (const report of reports) addReportRow(report, false);
}

fileInput.addEventListener('change', () => {
  const file = fileInput.files && fileInput.files[0];
  if (!file) return;
  const reader = new FileReader();
  reader.onerror = () => toast('Could not read the selected file', false);
  reader.onload = async () => {
    const res = await fetch('/api/report/image', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ session_id: sessionId, image: reader.result, mime_type: file.type })
    });
    if (!res.ok) {
      const err = await res.json();
      toast(err.error.message, false);
      return;
    }
    const body = await res.json();
    const preview = document.getElementById('preview');
    preview.src = body.preview;
    preview.style.display = 'block';
    // New file: verification starts over
    verified = false;
    verifyBtn.disabled = false;
    document.getElementById('verification-box').style.display = 'none';
    document.getElementById('type').value = '';
    document.getElementById('amount').value = '';
  };
  reader.readAsDataURL(file);
});

verifyBtn.addEventListener('click', async () => {
  verifyBtn.disabled = true;
  verifyBtn.textContent = 'Verifying...';
  try {
    const res = await fetch('/api/report/verify', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({ session_id: sessionId })
    });
    if (!res.ok) {
      const err = await res.json();
      toast(err.error.message, false);
      return;
    }
    const body = await res.json();
    if (body.status === 'success' && body.result) {
      verified = true;
      document.getElementById('result-type').textContent = body.result.wasteType;
      document.getElementById('result-quantity').textContent = body.result.quantity;
      document.getElementById('result-confidence').textContent =
        (body.result.confidence * 100).toFixed(2) + '%';
      document.getElementById('verification-box').style.display = 'block';
      document.getElementById('type').value = body.result.wasteType;
      document.getElementById('amount').value = body.result.quantity;
      toast('Waste verification successful!', true);
    } else {
      verified = false;
      toast('Verification failed: ' + (body.error || 'unknown error'), false);
    }
  } finally {
    verifyBtn.disabled = false;
    verifyBtn.textContent = 'Verify Waste';
  }
});

document.getElementById('location-search-btn').addEventListener('click', async () => {
  const query = document.getElementById('location').value.trim();
  if (!query) return;
  const res = await fetch('/api/places/search?query=' + encodeURIComponent(query));
  if (!res.ok) {
    const err = await res.json();
    toast(err.error.message, false);
    return;
  }
  const body = await res.json();
  if (body.address) document.getElementById('location').value = body.address;
});

submitBtn.addEventListener('click', async () => {
  if (!verified) {
    toast('Please verify the waste before submitting or log in.', false);
    return;
  }
  submitBtn.disabled = true;
  submitBtn.textContent = 'Submitting...';
  try {
    const res = await fetch('/api/report/submit', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        session_id: sessionId,
        location: document.getElementById('location').value
      })
    });
    if (!res.ok) {
      const err = await res.json();
      toast(err.error.message, false);
      return;
    }
    const body = await res.json();
    addReportRow(body.report, true);
    toast("Report submitted successfully! You've earned " + body.points_awarded +
          ' points for reporting waste.', true);
    // Reset the form to match the server-side workflow reset
    verified = false;
    fileInput.value = '';
    verifyBtn.disabled = true;
    document.getElementById('preview').style.display = 'none';
    document.getElementById('verification-box').style.display = 'none';
    document.getElementById('location').value = '';
    document.getElementById('type').value = '';
    document.getElementById('amount').value = '';
  } finally {
    submitBtn.disabled = false;
    submitBtn.textContent = 'Submit Report';
  }
});

openSession();
"#;

/// GET /report
pub async fn report_page() -> impl IntoResponse {
    Html(super::page("GreenLoop - Report Waste", BODY, SCRIPT))
}
