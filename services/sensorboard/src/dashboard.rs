//! Web dashboard rendering the current view tree as HTML and JSON

use std::time::Duration;

use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::state::StateHandle;
use crate::view::ViewTree;

/// Dashboard application state
#[derive(Clone)]
pub struct DashboardState {
    pub state: StateHandle,
    /// How often the page pulls `/api/view`
    pub refresh: Duration,
}

/// Build the dashboard axum router. The served page re-reads the view every
/// `refresh` and patches its elements by id.
pub fn build_router(state: StateHandle, refresh: Duration) -> Router {
    let dashboard_state = DashboardState { state, refresh };

    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(dashboard_state)
}

/// Render the page body for `view`. Element ids follow the keys of the tree:
/// `groups` container, `group-<id>` sections, `sensors-<id>` lists and
/// `sensor-<id>` items.
pub fn render_groups(view: &ViewTree) -> String {
    let groups: String = view
        .groups()
        .iter()
        .map(|group| {
            let items: String = group
                .sensors
                .items
                .iter()
                .map(|item| {
                    format!(
                        r#"<li id="{}">{}</li>"#,
                        escape_html(&item.key),
                        escape_html(&item.text)
                    )
                })
                .collect();
            format!(
                r#"<div id="{}" class="group"><h2>{}</h2><ul id="{}">{}</ul></div>"#,
                escape_html(&group.key),
                escape_html(&group.heading),
                escape_html(&group.sensors.key),
                items
            )
        })
        .collect();

    format!(r#"<div id="groups">{}</div>"#, groups)
}

// Mirrors the element contract of `render_groups`: existing elements are
// updated in place, new ones appended, and ones missing from the view removed.
const REFRESH_SCRIPT: &str = r#"
        function syncChildren(parent, wanted, create, update) {
            const keep = new Set(wanted.map(w => w.key));
            Array.from(parent.children).forEach(el => {
                if (!keep.has(el.id)) el.remove();
            });
            wanted.forEach(w => {
                let el = document.getElementById(w.key);
                if (!el) {
                    el = create(w);
                    parent.appendChild(el);
                }
                update(el, w);
            });
        }

        function createGroup(g) {
            const div = document.createElement('div');
            div.id = g.key;
            div.className = 'group';
            div.appendChild(document.createElement('h2'));
            const ul = document.createElement('ul');
            ul.id = g.sensors.key;
            div.appendChild(ul);
            return div;
        }

        function updateGroup(div, g) {
            const heading = div.querySelector('h2');
            if (heading.textContent !== g.heading) heading.textContent = g.heading;
            syncChildren(div.querySelector('ul'), g.sensors.items, createItem, updateItem);
        }

        function createItem(item) {
            const li = document.createElement('li');
            li.id = item.key;
            return li;
        }

        function updateItem(li, item) {
            if (li.textContent !== item.text) li.textContent = item.text;
        }

        function refreshView() {
            fetch('/api/view')
                .then(r => r.json())
                .then(view => {
                    const container = document.getElementById('groups');
                    syncChildren(container, view.groups, createGroup, updateGroup);
                })
                .catch(() => {});
        }
"#;

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

async fn index_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let body = render_groups(dashboard.state.read().await.view());

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Sensor Dashboard</title>
    <script>{script}
        setInterval(refreshView, {refresh_ms});
    </script>
</head>
<body>
    <h1>Sensor Dashboard</h1>
    {body}
</body>
</html>"#,
        script = REFRESH_SCRIPT,
        refresh_ms = dashboard.refresh.as_millis(),
        body = body,
    );

    Html(html)
}

async fn view_handler(State(dashboard): State<DashboardState>) -> impl IntoResponse {
    let state = dashboard.state.read().await;
    axum::Json(state.view().clone())
}

async fn health_handler() -> impl IntoResponse {
    "OK"
}
