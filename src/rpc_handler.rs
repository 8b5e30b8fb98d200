//! RPC method handler for the SmartMark JSON-RPC protocol.
//!
//! Kept apart from `rpc_server.rs` so it can be unit-tested. Every method
//! except `ping`, `auth.sign_in` and `auth.route` needs a session `token`;
//! view methods also need the `view_id` returned by `view.open`, and a view
//! is only reachable with a token of the viewer who opened it.

use std::sync::Mutex;

use serde_json::{json, Value};

use crate::app::App;
use crate::managers::bookmark_view::BookmarkListView;
use crate::services::identity::IdentityProvider;
use crate::store::record_store::RecordStoreTrait;
use crate::types::errors::ViewError;
use crate::types::identity::Route;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn viewer_for(app: &App, params: &Value) -> Result<String, String> {
    let token = params.get("token").and_then(|v| v.as_str());
    app.identity
        .current_viewer(token)
        .ok_or_else(|| ViewError::NotSignedIn.to_string())
}

/// Looks up an open view owned by `viewer`.
fn view_for<'a>(
    views: &'a mut crate::managers::view_registry::ViewRegistry,
    viewer: &str,
    params: &Value,
) -> Result<&'a mut BookmarkListView, String> {
    let view_id = str_param(params, "view_id")?;
    views
        .get_mut(view_id)
        .filter(|v| v.viewer() == viewer)
        .ok_or_else(|| format!("view not found: {}", view_id))
}

/// Dispatch a JSON-RPC method call.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(app: &Mutex<App>, method: &str, params: &Value) -> Result<Value, String> {
    let mut guard = app.lock().map_err(|e| e.to_string())?;
    let a = &mut *guard;

    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Auth ───
        "auth.sign_in" => {
            let provider = str_param(params, "provider")?;
            let subject = str_param(params, "subject")?;
            let display_name = params
                .get("display_name")
                .and_then(|v| v.as_str())
                .unwrap_or(subject);
            let signed_in = a
                .identity
                .sign_in(provider, subject, display_name)
                .map_err(|e| e.to_string())?;
            Ok(json!({"token": signed_in.token.as_str(), "viewer": signed_in.viewer}))
        }
        "auth.sign_out" => {
            let token = str_param(params, "token")?;
            if let Some(viewer) = a.identity.current_viewer(Some(token)) {
                let closed = a.views.close_for_viewer(&viewer);
                tracing::debug!(viewer = %viewer, closed, "views closed on sign-out");
            }
            a.identity.sign_out(token).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true}))
        }
        "auth.route" => {
            let token = params.get("token").and_then(|v| v.as_str());
            match a.identity.gate(token) {
                Route::Login => Ok(json!({"route": "login"})),
                Route::Dashboard(viewer) => Ok(json!({"route": "dashboard", "viewer": viewer})),
            }
        }

        // ─── Views ───
        "view.open" => {
            let viewer = viewer_for(a, params)?;
            let view = BookmarkListView::open(&a.store, a.store.feed(), &viewer)
                .map_err(|e| e.to_string())?;
            let render = view.render();
            let view_id = a.views.insert(view);
            Ok(json!({"view_id": view_id, "render": render}))
        }
        "view.render" => {
            let viewer = viewer_for(a, params)?;
            let view = view_for(&mut a.views, &viewer, params)?;
            Ok(json!(view.render()))
        }
        "view.sync" => {
            let viewer = viewer_for(a, params)?;
            let view = view_for(&mut a.views, &viewer, params)?;
            let changed = view.pump();
            Ok(json!({"changed": changed, "render": view.render()}))
        }
        "view.resync" => {
            let viewer = viewer_for(a, params)?;
            let view = view_for(&mut a.views, &viewer, params)?;
            view.resync(&a.store).map_err(|e| e.to_string())?;
            Ok(json!(view.render()))
        }
        "view.close" => {
            let viewer = viewer_for(a, params)?;
            view_for(&mut a.views, &viewer, params)?;
            let view_id = str_param(params, "view_id")?;
            Ok(json!({"ok": a.views.close(view_id)}))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let viewer = viewer_for(a, params)?;
            let title = str_param(params, "title")?;
            let url = str_param(params, "url")?;
            let view = view_for(&mut a.views, &viewer, params)?;
            let bookmark = view.submit_new(&a.store, title, url).map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": bookmark, "render": view.render()}))
        }
        "bookmark.update" => {
            let viewer = viewer_for(a, params)?;
            let id = str_param(params, "id")?;
            let title = str_param(params, "title")?;
            let url = str_param(params, "url")?;
            let view = view_for(&mut a.views, &viewer, params)?;
            let bookmark = view
                .submit_edit(&a.store, id, title, url)
                .map_err(|e| e.to_string())?;
            Ok(json!({"bookmark": bookmark, "render": view.render()}))
        }
        "bookmark.delete" => {
            let viewer = viewer_for(a, params)?;
            let id = str_param(params, "id")?;
            let view = view_for(&mut a.views, &viewer, params)?;
            view.delete(&a.store, id).map_err(|e| e.to_string())?;
            Ok(json!({"ok": true, "render": view.render()}))
        }
        "bookmark.list" => {
            let viewer = viewer_for(a, params)?;
            let bookmarks = a.store.list_for_owner(&viewer).map_err(|e| e.to_string())?;
            Ok(json!(bookmarks))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}

/// Pumps every open view and returns a `view.changed` notification for each
/// one whose list changed.
pub fn drain_notifications(app: &Mutex<App>) -> Vec<Value> {
    let mut a = match app.lock() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "app lock poisoned");
            return Vec::new();
        }
    };
    a.views
        .pump_all()
        .into_iter()
        .map(|(view_id, render)| json!({"event": "view.changed", "view_id": view_id, "render": render}))
        .collect()
}
