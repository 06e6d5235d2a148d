//! Browser UI. Server-rendered shells; the forms call the JSON API.
//!
//! Selected papers live in `localStorage` so a selection made on the search
//! page carries over to the Q&A and future-works pages.

use axum::{extract::State, response::Html};
use tracing::warn;

use crate::state::SharedState;

/// Navigation HTML shared across all pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7fb; color: #1f2430; }
.nav { display: flex; gap: 1.25rem; align-items: center; padding: 0.9rem 2rem; background: #1f2a44; }
.nav a { color: #dbe4ff; text-decoration: none; }
.nav .brand { font-weight: 700; color: #fff; margin-right: 1rem; }
.nav-note { margin-left: auto; color: #9fb0d8; font-size: 0.85rem; }
main { max-width: 960px; margin: 2rem auto; padding: 0 1.5rem; }
.card { background: #fff; border-radius: 10px; padding: 1.1rem 1.3rem; margin-bottom: 1rem; box-shadow: 0 1px 3px rgba(0,0,0,0.08); }
label { display: block; margin: 0.6rem 0 0.2rem; font-weight: 600; }
input, textarea, select { width: 100%; padding: 0.5rem; border: 1px solid #c9cfdd; border-radius: 6px; box-sizing: border-box; }
button { margin-top: 0.9rem; padding: 0.5rem 1.2rem; border: 0; border-radius: 6px; background: #3b5bdb; color: #fff; cursor: pointer; }
button.secondary { background: #868e96; }
.muted { color: #6b7285; font-size: 0.9rem; }
.error { color: #c92a2a; }
.answer { white-space: pre-wrap; line-height: 1.55; }
"#;

/// Selection helpers shared by every page.
const COMMON_JS: &str = r#"
const KEY = "paperlens.selected";
function selected() { return JSON.parse(localStorage.getItem(KEY) || "{}"); }
function saveSelected(s) { localStorage.setItem(KEY, JSON.stringify(s)); renderCount(); }
function toggle(id, title) {
  const s = selected();
  if (s[id]) { delete s[id]; } else { s[id] = title; }
  saveSelected(s);
}
function renderCount() {
  const n = Object.keys(selected()).length;
  const el = document.getElementById("selection-count");
  if (el) el.textContent = n ? n + " paper(s) selected" : "";
}
function esc(t) {
  const d = document.createElement("div");
  d.textContent = t == null ? "" : String(t);
  return d.innerHTML;
}
function renderSelection(target) {
  const s = selected();
  const ids = Object.keys(s);
  target.innerHTML = ids.length
    ? ids.map(id => "<div class='card'><strong>" + esc(s[id]) + "</strong> <span class='muted'>" + esc(id) + "</span></div>").join("")
    : "<p class='muted'>No papers selected. Pick some on the search page, or give a topic.</p>";
}
async function postJson(url, body) {
  const resp = await fetch(url, { method: "POST", headers: { "Content-Type": "application/json" }, body: JSON.stringify(body) });
  const data = await resp.json().catch(() => ({ detail: resp.statusText }));
  if (!resp.ok) throw new Error(data.detail || resp.statusText);
  return data;
}
renderCount();
"#;

const SEARCH_JS: &str = r#"
function paperCard(p) {
  const checked = selected()[p.paper_id] ? "checked" : "";
  return "<div class='card'><label><input type='checkbox' style='width:auto' " + checked +
    " onchange='toggle(" + JSON.stringify(p.paper_id) + "," + JSON.stringify(p.title) + ")'> " + esc(p.title) + "</label>" +
    "<div class='muted'>" + esc((p.authors || []).join(", ")) + " · " + esc(p.year || "Unknown Year") + "</div>" +
    "<p>" + esc(p.abstract) + "</p>" +
    (p.url ? "<a href='" + esc(p.url) + "' target='_blank'>PDF</a>" : "") + "</div>";
}
document.getElementById("search-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const out = document.getElementById("results");
  out.innerHTML = "<p class='muted'>Searching arXiv...</p>";
  try {
    const data = await postJson("/search", {
      topic: document.getElementById("topic").value,
      max_results: Number(document.getElementById("max_results").value),
      years_back: Number(document.getElementById("years_back").value),
      fetch_content: document.getElementById("fetch_content").checked,
    });
    out.innerHTML = "<p class='muted'>" + esc(data.message) + "</p>" + data.papers.map(paperCard).join("");
  } catch (err) {
    out.innerHTML = "<p class='error'>" + esc(err.message) + "</p>";
  }
});
"#;

const QA_JS: &str = r#"
renderSelection(document.getElementById("selection"));
document.getElementById("qa-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const out = document.getElementById("answer");
  out.innerHTML = "<p class='muted'>Thinking...</p>";
  const topic = document.getElementById("topic").value.trim();
  try {
    const data = await postJson("/qa", {
      question: document.getElementById("question").value,
      paper_ids: Object.keys(selected()),
      topic: topic || null,
    });
    const cites = (data.citations || []).map(c => "<li>" + esc(c.full_citation) + "</li>").join("");
    out.innerHTML = "<div class='card'><h3>Answer</h3><div class='answer'>" + esc(data.answer) + "</div>" +
      (cites ? "<h4>Citations</h4><ul>" + cites + "</ul>" : "") + "</div>";
  } catch (err) {
    out.innerHTML = "<p class='error'>" + esc(err.message) + "</p>";
  }
});
"#;

const FUTURE_WORKS_JS: &str = r#"
renderSelection(document.getElementById("selection"));
document.getElementById("fw-form").addEventListener("submit", async (e) => {
  e.preventDefault();
  const out = document.getElementById("result");
  out.innerHTML = "<p class='muted'>Generating...</p>";
  try {
    const data = await postJson("/generate-future-works", {
      topic: document.getElementById("topic").value,
      years_back: Number(document.getElementById("years_back").value),
      kind: document.getElementById("kind").value,
      paper_ids: Object.keys(selected()),
    });
    const based = (data.based_on_papers || []).map(p => "<li>" + esc(p.title) + " (" + esc(p.year || "n.d.") + ")</li>").join("");
    out.innerHTML = "<div class='card'><h3>Suggested Future Research</h3><div class='answer'>" + esc(data.future_work) + "</div>" +
      (based ? "<h4>Based on</h4><ul>" + based + "</ul>" : "") + "</div>";
  } catch (err) {
    out.innerHTML = "<p class='error'>" + esc(err.message) + "</p>";
  }
});
"#;

fn render_page(title: &str, body: &str, script: &str) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} — Paperlens</title>
    <style>{STYLE}</style>
</head>
<body>
{NAV_HTML}
<main>
{body}
</main>
<script>{COMMON_JS}{script}</script>
</body>
</html>"#)
}

/// Minimal HTML escaping for server-rendered values.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// GET /ui - Overview with stored topics
pub async fn home_page(State(state): State<SharedState>) -> Html<String> {
    let topics_html = match state.database.get_all_topics().await {
        Ok(topics) if topics.is_empty() => {
            r#"<p class="muted">No topics stored yet. Run a search to populate the graph.</p>"#.to_string()
        }
        Ok(topics) => {
            let items: String = topics
                .iter()
                .map(|t| format!("<li>{}</li>", escape(t)))
                .collect();
            format!("<ul>{}</ul>", items)
        }
        Err(e) => {
            warn!(error = %e, "could not list topics");
            r#"<p class="error">The paper graph is unavailable.</p>"#.to_string()
        }
    };

    let body = format!(r#"
<div class="card">
    <h1>Academic research paper assistant</h1>
    <p>Search arXiv for papers on a topic, store them in the paper graph, ask questions
    grounded in their text and generate directions for future research.</p>
    <ol>
        <li>Search a topic and tick the papers you care about.</li>
        <li>Ask a question about the selected papers.</li>
        <li>Generate ideas, a review or an improvement plan.</li>
    </ol>
</div>
<div class="card">
    <h2>Stored topics</h2>
    {topics_html}
</div>"#);
    Html(render_page("Home", &body, ""))
}

/// GET /ui/search
pub async fn search_page() -> Html<String> {
    let body = r#"
<div class="card">
    <h1>Search for research papers</h1>
    <form id="search-form">
        <label for="topic">Research topic</label>
        <input id="topic" required>
        <label for="max_results">Number of results</label>
        <input id="max_results" type="number" min="1" max="50" value="10">
        <label for="years_back">Look back years</label>
        <input id="years_back" type="number" min="1" max="20" value="5">
        <label><input id="fetch_content" type="checkbox" style="width:auto" checked> Download and store full text</label>
        <button type="submit">Search</button>
    </form>
</div>
<div id="results"></div>"#;
    Html(render_page("Search", body, SEARCH_JS))
}

/// GET /ui/qa
pub async fn qa_page() -> Html<String> {
    let body = r#"
<div class="card">
    <h1>Ask a question about papers</h1>
    <div id="selection"></div>
    <form id="qa-form">
        <label for="question">Question</label>
        <textarea id="question" rows="3" required></textarea>
        <label for="topic">Topic (used when no papers are selected)</label>
        <input id="topic">
        <button type="submit">Get answer</button>
        <button type="button" class="secondary" onclick="saveSelected({}); renderSelection(document.getElementById('selection'))">Clear selection</button>
    </form>
</div>
<div id="answer"></div>"#;
    Html(render_page("Q&amp;A", body, QA_JS))
}

/// GET /ui/future-works
pub async fn future_works_page() -> Html<String> {
    let body = r#"
<div class="card">
    <h1>Generate future research directions</h1>
    <div id="selection"></div>
    <form id="fw-form">
        <label for="topic">Research topic</label>
        <input id="topic" required>
        <label for="years_back">Look back years</label>
        <input id="years_back" type="number" min="1" max="20" value="5">
        <label for="kind">Output</label>
        <select id="kind">
            <option value="ideas">Research ideas</option>
            <option value="review">Review paper</option>
            <option value="improvement_plan">Improvement plan</option>
        </select>
        <button type="submit">Generate</button>
    </form>
</div>
<div id="result"></div>"#;
    Html(render_page("Future Works", body, FUTURE_WORKS_JS))
}
