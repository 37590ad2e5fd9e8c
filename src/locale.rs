//! Human-readable labels and icon names for metric keys.
//!
//! Screens receive a [`Translate`] implementation instead of reaching for a
//! global table, so hosts can plug in their own wording.

use std::collections::HashMap;

/// Icon shown when a key has no dedicated icon.
pub const FALLBACK_ICON: &str = "info_outline";

pub trait Translate: Send + Sync {
    /// Label for a key. Unknown keys come back unchanged.
    fn translate(&self, key: &str) -> String;

    /// Material icon name for a key.
    fn icon_for(&self, key: &str) -> String;
}

const EN: &[(&str, &str)] = &[
    ("server_current_state", "State"),
    ("connections", "Connections"),
    ("uptime", "uptime"),
    ("received_messages", "Received messages"),
    ("received_messages_per_second", "Received messages (m/s)"),
    ("sent_messages", "Sent messages"),
    ("sent_messages_per_second", "Sent messages (m/s)"),
    ("commands_waiting", "Commands waiting"),
    ("queries_waiting", "Queries waiting"),
    ("go_routines", "Go routines spawned"),
    ("system_memory", "System memory"),
    ("allocated_memory", "Allocated memory"),
    ("heap_allocated_memory", "Allocated heap memory"),
    ("secs", "seconds"),
    ("payload_to_send", "Payload to send"),
    ("send_as_command", "Send as command"),
    ("send_as_query", "Send as query"),
    ("responses", "Responses"),
    ("system_status", "System status"),
    ("connected_devices", "Connected devices"),
    ("device_status", "Device status"),
    ("device_control", "Device control"),
    ("last_connection", "Last connection"),
    ("view_device", "View"),
    ("actions", "Actions"),
];

const ES: &[(&str, &str)] = &[
    ("server_current_state", "Estado"),
    ("connections", "Conexiones"),
    ("uptime", "uptime"),
    ("received_messages", "Mensajes recibidos"),
    ("received_messages_per_second", "Mensajes recibidos (por seg.)"),
    ("sent_messages", "Mensajes enviados"),
    ("sent_messages_per_second", "Mensajes enviados (por seg.)"),
    ("commands_waiting", "Órdenes en cola"),
    ("queries_waiting", "Preguntas en cola"),
    ("go_routines", "Go routines activas"),
    ("system_memory", "Memoria de sistema"),
    ("allocated_memory", "Memoria alojada"),
    ("heap_allocated_memory", "Memoria alojada en la pila"),
    ("secs", "segundos"),
    ("payload_to_send", "Mensaje a enviar"),
    ("send_as_command", "Enviar como órden"),
    ("send_as_query", "Enviar como pregunta"),
    ("responses", "Respuestas"),
    ("system_status", "Estado del sistema"),
    ("connected_devices", "Dispositivos conectados"),
    ("device_status", "Estado del dispositivo"),
    ("device_control", "Control del dispositivo"),
    ("last_connection", "Última conexión"),
    ("view_device", "Ver"),
    ("actions", "Acciones"),
];

const ICONS: &[(&str, &str)] = &[
    ("server_current_state", "power_settings_new"),
    ("connections", "settings_input_antenna"),
    ("uptime", "timer"),
    ("received_messages", "call_received"),
    ("received_messages_per_second", "call_received"),
    ("sent_messages", "call_made"),
    ("sent_messages_per_second", "call_made"),
    ("commands_waiting", "hourglass_empty"),
    ("queries_waiting", "hourglass_empty"),
    ("go_routines", "device_hub"),
    ("system_memory", "memory"),
    ("allocated_memory", "memory"),
    ("heap_allocated_memory", "memory"),
    ("sse_subscribers", "rss_feed"),
    ("send_command", "send"),
    ("send_query", "help_outline"),
];

/// Built-in label and icon tables.
#[derive(Debug, Clone)]
pub struct Locale {
    language: String,
    texts: HashMap<&'static str, &'static str>,
    icons: HashMap<&'static str, &'static str>,
}

impl Locale {
    /// Load the tables for a language code. Anything other than `es`
    /// falls back to English.
    pub fn for_language(language: &str) -> Self {
        let (language, table) = match language {
            "es" => ("es", ES),
            _ => ("en", EN),
        };
        Self {
            language: language.to_string(),
            texts: table.iter().copied().collect(),
            icons: ICONS.iter().copied().collect(),
        }
    }

    pub fn english() -> Self {
        Self::for_language("en")
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::english()
    }
}

impl Translate for Locale {
    fn translate(&self, key: &str) -> String {
        self.texts.get(key).copied().unwrap_or(key).to_string()
    }

    fn icon_for(&self, key: &str) -> String {
        self.icons.get(key).copied().unwrap_or(FALLBACK_ICON).to_string()
    }
}
