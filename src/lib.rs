mod config;
mod export;
mod ids;
pub mod manager;
pub mod models;
pub mod store;
mod utils;

use std::sync::Mutex;

use serde::Serialize;
use tauri::{Manager, State};

use config::ConfigStore;
use manager::EventManager;
use models::{Event, EventDraft, EventPatch, Registration};
use store::SqliteStore;

const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

pub struct AppState {
    manager: Mutex<EventManager<SqliteStore>>,
}

/// Advisory flag mirroring the admin panel being open; commands do not
/// gate on it.
#[derive(Default)]
pub struct AdminSession(Mutex<bool>);

#[derive(Debug, Serialize)]
struct EventStatsData {
    total: usize,
    upcoming: usize,
}

#[derive(Debug, Serialize)]
struct EventDetailData {
    event: Event,
    seats_left: u32,
    full: bool,
}

#[tauri::command]
fn list_events(filter: Option<String>, state: State<'_, AppState>) -> Result<Vec<Event>, String> {
    let manager = lock_manager(&state)?;
    Ok(manager.list_events(filter.as_deref()))
}

#[tauri::command]
fn event_stats(state: State<'_, AppState>) -> Result<EventStatsData, String> {
    let manager = lock_manager(&state)?;
    Ok(EventStatsData {
        total: manager.list_events(None).len(),
        upcoming: manager.count_upcoming(),
    })
}

#[tauri::command]
fn event_detail(event_id: String, state: State<'_, AppState>) -> Result<EventDetailData, String> {
    let manager = lock_manager(&state)?;
    let event = manager.get_event(&event_id).map_err(|e| e.to_string())?;
    let seats_left = manager.seats_remaining(&event_id).map_err(|e| e.to_string())?;
    let full = manager.is_full(&event_id).map_err(|e| e.to_string())?;
    Ok(EventDetailData { event, seats_left, full })
}

#[tauri::command]
fn create_event(draft: EventDraft, state: State<'_, AppState>) -> Result<Event, String> {
    let manager = lock_manager(&state)?;
    manager.create_event(draft).map_err(|e| e.to_string())
}

#[tauri::command]
fn update_event(
    event_id: String,
    patch: EventPatch,
    state: State<'_, AppState>,
) -> Result<Event, String> {
    let manager = lock_manager(&state)?;
    manager.update_event(&event_id, patch).map_err(|e| e.to_string())
}

#[tauri::command]
fn delete_event(event_id: String, state: State<'_, AppState>) -> Result<(), String> {
    let manager = lock_manager(&state)?;
    manager.delete_event(&event_id).map_err(|e| e.to_string())
}

#[tauri::command]
fn register_attendee(
    event_id: String,
    name: String,
    email: String,
    phone: Option<String>,
    state: State<'_, AppState>,
) -> Result<Registration, String> {
    let manager = lock_manager(&state)?;
    manager
        .register(&event_id, &name, &email, phone.as_deref())
        .map_err(|e| e.to_string())
}

#[tauri::command]
fn list_registrations(
    event_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<Registration>, String> {
    let manager = lock_manager(&state)?;
    Ok(manager.registrations_for(&event_id))
}

/// Writes the requested CSV under the exports directory and returns its
/// path; the frontend hands the path to the opener plugin.
#[tauri::command]
fn export_registrations(
    event_id: Option<String>,
    state: State<'_, AppState>,
    config_store: State<'_, ConfigStore>,
) -> Result<String, String> {
    let manager = lock_manager(&state)?;
    let (csv_text, file_name) = match &event_id {
        Some(id) => {
            let registrations = manager.registrations_for(id);
            if registrations.is_empty() {
                return Err("no registrations to export".into());
            }
            let csv = export::event_registrations_csv(&registrations)
                .map_err(|e| e.to_string())?;
            (csv, format!("regs_{id}.csv"))
        }
        None => {
            let registrations = manager.all_registrations();
            if registrations.is_empty() {
                return Err("no registrations to export".into());
            }
            let csv = export::all_registrations_csv(&registrations)
                .map_err(|e| e.to_string())?;
            (csv, "all_regs.csv".to_string())
        }
    };

    let dir = config_store
        .read()
        .export_dir
        .unwrap_or_else(utils::exports_dir);
    let path = dir.join(file_name);
    export::write_export(&path, &csv_text).map_err(|e| e.to_string())?;
    Ok(path.to_string_lossy().into_owned())
}

#[tauri::command]
fn placeholder_image(title: String) -> String {
    utils::svg_placeholder(&title)
}

#[tauri::command]
fn admin_login(
    password: String,
    session: State<'_, AdminSession>,
    config_store: State<'_, ConfigStore>,
) -> Result<bool, String> {
    let expected = config_store
        .read()
        .admin_password
        .unwrap_or_else(|| DEFAULT_ADMIN_PASSWORD.to_string());
    let granted = password == expected;
    if granted {
        *lock_session(&session)? = true;
    }
    Ok(granted)
}

#[tauri::command]
fn admin_logout(session: State<'_, AdminSession>) -> Result<(), String> {
    *lock_session(&session)? = false;
    Ok(())
}

#[tauri::command]
fn admin_status(session: State<'_, AdminSession>) -> Result<bool, String> {
    Ok(*lock_session(&session)?)
}

fn lock_manager<'a>(
    state: &'a State<'_, AppState>,
) -> Result<std::sync::MutexGuard<'a, EventManager<SqliteStore>>, String> {
    state
        .manager
        .lock()
        .map_err(|_| "manager mutex poisoned".to_string())
}

fn lock_session<'a>(
    session: &'a State<'_, AdminSession>,
) -> Result<std::sync::MutexGuard<'a, bool>, String> {
    session
        .0
        .lock()
        .map_err(|_| "session mutex poisoned".to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .manage(ConfigStore::load())
        .manage(AdminSession::default())
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_log::Builder::default().build())
        .invoke_handler(tauri::generate_handler![
            list_events,
            event_stats,
            event_detail,
            create_event,
            update_event,
            delete_event,
            register_attendee,
            list_registrations,
            export_registrations,
            placeholder_image,
            admin_login,
            admin_logout,
            admin_status
        ])
        .setup(|app| {
            let manager = EventManager::new(SqliteStore::open_default()?);
            manager.seed_if_empty()?;
            app.manage(AppState {
                manager: Mutex::new(manager),
            });
            Ok(())
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
