//! # Listado de Directorios
//! src/files/listing.rs
//!
//! Genera una tabla HTML con el contenido de un directorio: subdirectorios
//! y archivos con extensión permitida, ordenados por nombre.

use super::VALID_EXTENSIONS;
use chrono::{DateTime, Local};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::fs;
use std::io;
use std::path::Path;

/// Caracteres a escapar dentro de un segmento de URL
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

/// Una fila del listado
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    icon: &'static str,
    name: String,
    modified: String,
    size: String,
}

/// Renderiza el listado de `dir`, que se pidió como `request_path`
pub fn render(dir: &Path, request_path: &str) -> io::Result<String> {
    let mut names: Vec<String> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    let mut entries = Vec::new();
    if request_path != "/" {
        entries.push(Entry {
            icon: "⬆️",
            name: "../".to_string(),
            modified: String::new(),
            size: String::new(),
        });
    }

    for name in names {
        // Entradas que desaparecen o symlinks rotos se omiten
        let Ok(metadata) = fs::metadata(dir.join(&name)) else {
            continue;
        };
        let modified = metadata
            .modified()
            .map(|time| format_modified_time(time.into()))
            .unwrap_or_default();

        if metadata.is_dir() {
            entries.push(Entry {
                icon: "📁",
                name: format!("{}/", name),
                modified,
                size: "-".to_string(),
            });
        } else if let Some(icon) = file_icon(&name) {
            entries.push(Entry {
                icon,
                name,
                modified,
                size: format_size(metadata.len()),
            });
        }
    }

    Ok(page(request_path, &entries))
}

/// Icono para un archivo servible, `None` si la extensión no está permitida
fn file_icon(name: &str) -> Option<&'static str> {
    let extension = Path::new(name).extension()?.to_str()?;
    if !VALID_EXTENSIONS.contains(&extension) {
        return None;
    }

    Some(match extension {
        "pdf" => "📄",
        "png" => "🖼️",
        _ => "🌐",
    })
}

/// Tamaño legible: B, KB, MB o GB con un decimal
pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s < KB => format!("{} B", s),
        s if s < MB => format!("{:.1} KB", s as f64 / KB as f64),
        s if s < GB => format!("{:.1} MB", s as f64 / MB as f64),
        s => format!("{:.1} GB", s as f64 / GB as f64),
    }
}

pub fn format_modified_time(time: DateTime<Local>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn page(request_path: &str, entries: &[Entry]) -> String {
    let base = if request_path.ends_with('/') {
        request_path.to_string()
    } else {
        format!("{}/", request_path)
    };

    let rows: String = entries
        .iter()
        .map(|entry| {
            let href = format!(
                "{}{}",
                base,
                utf8_percent_encode(entry.name.trim_end_matches('/'), SEGMENT)
            );
            format!(
                "<tr><td>{}</td><td><a href='{}'>{}</a></td><td>{}</td><td>{}</td></tr>\n",
                entry.icon,
                escape_html(&href),
                escape_html(&entry.name),
                entry.modified,
                entry.size
            )
        })
        .collect();

    let title = escape_html(&base);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset='UTF-8'>
    <title>=(^.^)= {title}</title>
</head>
<body>
    <main>
        <h1>{title}</h1>
        <table>
        <tr><th></th><th>Name</th><th>Last Modified</th><th>Size</th></tr>
{rows}        </table>
    </main>
</body>
</html>
"#
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
        .replace('"', "&quot;")
}
